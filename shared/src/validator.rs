//! Command validation against the closed vocabulary.
//!
//! Validation is total and side-effect-free: the caller writes the accepted
//! command into the store on success, so this module needs no storage access
//! and tests with no mocking.

use crate::vocabulary::{CommandSet, DeviceClass};
use crate::{AcceptedCommand, CommandSubmission, Params, Rejection};
use serde_json::Value;

/// Validate a raw submission, short-circuiting on the first failure.
///
/// Checks run in a fixed order: missing fields, unknown device, then the
/// class-specific rule (exact command membership for fixed-vocabulary
/// classes, parameter presence for open-parameter classes). Parameters, when
/// supplied, must be a structured map for any class; the accepted command
/// defaults them to an empty map.
pub fn validate(submission: &CommandSubmission) -> Result<AcceptedCommand, Rejection> {
    if submission.device.is_empty() {
        return Err(Rejection::MissingField("device"));
    }
    if submission.command.is_empty() {
        return Err(Rejection::MissingField("command"));
    }

    let device = DeviceClass::from_wire(&submission.device)
        .ok_or_else(|| Rejection::UnknownDevice(submission.device.clone()))?;

    match device.command_set() {
        CommandSet::Fixed(allowed) => {
            if !allowed.contains(&submission.command.as_str()) {
                return Err(Rejection::UnknownCommand(submission.command.clone()));
            }
        }
        CommandSet::Open => {
            if !matches!(submission.parameters, Some(Value::Object(_))) {
                return Err(Rejection::MissingParameters);
            }
        }
    }

    let parameters = match &submission.parameters {
        Some(Value::Object(map)) => map.clone(),
        Some(_) => return Err(Rejection::MissingParameters),
        None => Params::new(),
    };

    Ok(AcceptedCommand {
        device,
        command: submission.command.clone(),
        parameters,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn submission(device: &str, command: &str) -> CommandSubmission {
        CommandSubmission {
            device: device.into(),
            command: command.into(),
            parameters: None,
        }
    }

    #[test]
    fn test_door_open_accepted() {
        let accepted = validate(&submission("DOOR", "DOOR_OPEN")).expect("should accept");
        assert_eq!(accepted.device, DeviceClass::Door);
        assert_eq!(accepted.command, "DOOR_OPEN");
        assert!(accepted.parameters.is_empty());
    }

    #[test]
    fn test_cross_device_command_rejected() {
        let err = validate(&submission("DOOR", "CURTAIN_OPEN")).unwrap_err();
        assert_eq!(err, Rejection::UnknownCommand("CURTAIN_OPEN".into()));
    }

    #[test]
    fn test_missing_fields_rejected_first() {
        let err = validate(&submission("", "DOOR_OPEN")).unwrap_err();
        assert_eq!(err, Rejection::MissingField("device"));

        let err = validate(&submission("DOOR", "")).unwrap_err();
        assert_eq!(err, Rejection::MissingField("command"));

        // Empty device wins over anything else about the submission
        let err = validate(&submission("", "")).unwrap_err();
        assert_eq!(err, Rejection::MissingField("device"));
    }

    #[test]
    fn test_unknown_device_rejected() {
        let err = validate(&submission("GARAGE", "DOOR_OPEN")).unwrap_err();
        assert_eq!(err, Rejection::UnknownDevice("GARAGE".into()));
    }

    #[test]
    fn test_case_sensitivity() {
        let err = validate(&submission("DOOR", "door_open")).unwrap_err();
        assert_eq!(err, Rejection::UnknownCommand("door_open".into()));
    }

    #[test]
    fn test_custom_requires_parameters() {
        let err = validate(&submission("CUSTOM", "ANYTHING")).unwrap_err();
        assert_eq!(err, Rejection::MissingParameters);

        let mut sub = submission("CUSTOM", "ANYTHING");
        sub.parameters = Some(json!({"x": 1}));
        let accepted = validate(&sub).expect("should accept");
        assert_eq!(accepted.device, DeviceClass::Custom);
        assert_eq!(accepted.parameters.get("x"), Some(&json!(1)));
    }

    #[test]
    fn test_custom_rejects_non_map_parameters() {
        for bad in [json!(null), json!([1, 2]), json!("scalar"), json!(7)] {
            let mut sub = submission("CUSTOM", "ANYTHING");
            sub.parameters = Some(bad);
            assert_eq!(validate(&sub).unwrap_err(), Rejection::MissingParameters);
        }
    }

    #[test]
    fn test_fixed_class_rejects_non_map_parameters() {
        let mut sub = submission("DOOR", "DOOR_OPEN");
        sub.parameters = Some(json!([1, 2, 3]));
        assert_eq!(validate(&sub).unwrap_err(), Rejection::MissingParameters);
    }

    #[test]
    fn test_fixed_class_carries_parameters() {
        let mut sub = submission("CURTAIN", "CURTAIN_OPEN");
        sub.parameters = Some(json!({"position": 50}));
        let accepted = validate(&sub).expect("should accept");
        assert_eq!(accepted.parameters.get("position"), Some(&json!(50)));
    }

    #[test]
    fn test_validation_is_deterministic() {
        let mut sub = submission("CUSTOM", "PULSE");
        sub.parameters = Some(json!({"ms": 250}));
        let first = validate(&sub).expect("should accept");
        let second = validate(&sub).expect("should accept");
        assert_eq!(first, second);
    }
}
