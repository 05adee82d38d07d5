//! Closed command vocabulary for the actuator fleet.
//!
//! Every device class maps to either a fixed, exact-match command set or to
//! the open-parameter escape hatch. New open-ended classes only need a new
//! variant mapped to [`CommandSet::Open`]; the validator never special-cases
//! class names.

use serde::{Deserialize, Serialize};

/// Device classes known to the relay. Immutable, defined at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeviceClass {
    Door,
    Curtain,
    LivingRoomLed,
    BedroomLed,
    BathroomLed,
    SolarPanel,
    Custom,
}

/// The commands a device class accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandSet {
    /// Exact-match, case-sensitive command names
    Fixed(&'static [&'static str]),
    /// Escape hatch: any command name, structured parameters required
    Open,
}

const DOOR_COMMANDS: &[&str] = &["DOOR_OPEN", "DOOR_CLOSE", "DOOR_LOCK", "DOOR_UNLOCK"];
const CURTAIN_COMMANDS: &[&str] = &["CURTAIN_OPEN", "CURTAIN_CLOSE", "CURTAIN_STOP"];
const LED_COMMANDS: &[&str] = &["LED_ON", "LED_OFF", "LED_TOGGLE"];
const SOLAR_COMMANDS: &[&str] = &["SOLAR_ON", "SOLAR_OFF"];

impl DeviceClass {
    /// All device classes, in declaration order
    pub const ALL: &'static [DeviceClass] = &[
        DeviceClass::Door,
        DeviceClass::Curtain,
        DeviceClass::LivingRoomLed,
        DeviceClass::BedroomLed,
        DeviceClass::BathroomLed,
        DeviceClass::SolarPanel,
        DeviceClass::Custom,
    ];

    /// The command set this class accepts
    pub fn command_set(self) -> CommandSet {
        match self {
            DeviceClass::Door => CommandSet::Fixed(DOOR_COMMANDS),
            DeviceClass::Curtain => CommandSet::Fixed(CURTAIN_COMMANDS),
            DeviceClass::LivingRoomLed | DeviceClass::BedroomLed | DeviceClass::BathroomLed => {
                CommandSet::Fixed(LED_COMMANDS)
            }
            DeviceClass::SolarPanel => CommandSet::Fixed(SOLAR_COMMANDS),
            DeviceClass::Custom => CommandSet::Open,
        }
    }

    /// The identifier used for this class on the wire (e.g. `"LIVING_ROOM_LED"`)
    pub fn wire_name(self) -> &'static str {
        match self {
            DeviceClass::Door => "DOOR",
            DeviceClass::Curtain => "CURTAIN",
            DeviceClass::LivingRoomLed => "LIVING_ROOM_LED",
            DeviceClass::BedroomLed => "BEDROOM_LED",
            DeviceClass::BathroomLed => "BATHROOM_LED",
            DeviceClass::SolarPanel => "SOLAR_PANEL",
            DeviceClass::Custom => "CUSTOM",
        }
    }

    /// Resolve a wire identifier against the vocabulary
    pub fn from_wire(name: &str) -> Option<DeviceClass> {
        DeviceClass::ALL
            .iter()
            .copied()
            .find(|class| class.wire_name() == name)
    }

    /// Whether this class accepts the given command name
    pub fn allows(self, command: &str) -> bool {
        match self.command_set() {
            CommandSet::Fixed(allowed) => allowed.contains(&command),
            CommandSet::Open => true,
        }
    }
}
