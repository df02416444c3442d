use serde::Serialize;

use super::place::LocationResult;

/// Why a fetch produced nothing new.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingReason {
    /// A permission prompt was raised; the user has not answered yet.
    PermissionPending,
    /// Permission is granted but the device location subsystem is off.
    LocationServicesDisabled,
}

impl std::fmt::Display for PendingReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PendingReason::PermissionPending => write!(f, "waiting for location permission"),
            PendingReason::LocationServicesDisabled => write!(f, "please enable location"),
        }
    }
}

/// Result of one `fetch_location_and_places` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FetchOutcome {
    /// Nothing to show yet; retry on the next trigger.
    NoOp { reason: PendingReason },
    Success(LocationResult),
    Failure { message: String },
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success(_))
    }

    pub fn is_noop(&self) -> bool {
        matches!(self, FetchOutcome::NoOp { .. })
    }

    pub fn result(&self) -> Option<&LocationResult> {
        match self {
            FetchOutcome::Success(result) => Some(result),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcomes_serialize_with_status_tag() {
        let noop = FetchOutcome::NoOp {
            reason: PendingReason::LocationServicesDisabled,
        };
        let json = serde_json::to_value(&noop).unwrap();
        assert_eq!(json["status"], "no_op");
        assert_eq!(json["reason"], "location_services_disabled");

        let failure = FetchOutcome::Failure {
            message: "boom".into(),
        };
        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(json["status"], "failure");
        assert_eq!(json["message"], "boom");
    }
}
