//! Input validation for network requests.
//!
//! Messages are user facing and returned verbatim in validation envelopes.

use regex::Regex;
use vpcforge_rs_protocol::CreateNetworkRequest;

use crate::error::OrchestratorError;

pub const MAX_NAME_LEN: usize = 255;
pub const MIN_PREFIX: u32 = 16;
pub const MAX_PREFIX: u32 = 28;

const NAME_PATTERN: &str = r"^[a-zA-Z0-9][a-zA-Z0-9_-]*$";
const VPC_ID_PATTERN: &str = r"^vpc-[a-f0-9]{8,17}$";

/// Validated inputs of a create request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCreate {
    pub name: String,
    pub cidr_block: String,
}

/// Check a network name.
pub fn validate_name(name: &str) -> Result<(), OrchestratorError> {
    if name.is_empty() {
        return Err(OrchestratorError::validation("VPC name is required"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(OrchestratorError::validation(
            "VPC name must be 255 characters or less",
        ));
    }
    if !name.chars().next().is_some_and(char::is_alphanumeric) {
        return Err(OrchestratorError::validation(
            "VPC name must start with an alphanumeric character",
        ));
    }
    if !matches_pattern(NAME_PATTERN, name)? {
        return Err(OrchestratorError::validation(
            "VPC name can only contain alphanumeric characters, hyphens, and underscores",
        ));
    }
    Ok(())
}

/// Check a network address block: dotted IPv4 with a /16../28 prefix.
pub fn validate_cidr_block(cidr_block: &str) -> Result<(), OrchestratorError> {
    if cidr_block.is_empty() {
        return Err(OrchestratorError::validation("CIDR block is required"));
    }
    let Some((address, prefix)) = cidr_block.split_once('/') else {
        return Err(OrchestratorError::validation(
            "CIDR block must include a prefix (e.g., 10.0.0.0/16)",
        ));
    };
    if prefix.contains('/') {
        return Err(invalid_format("too many '/' separators"));
    }

    let octets: Vec<&str> = address.split('.').collect();
    if octets.len() != 4 {
        return Err(OrchestratorError::validation(
            "CIDR block must have valid IPv4 address format",
        ));
    }
    for octet in octets {
        let value: i64 = octet
            .trim()
            .parse()
            .map_err(|_| invalid_format(&format!("invalid number '{octet}'")))?;
        if !(0..=255).contains(&value) {
            return Err(OrchestratorError::validation(format!(
                "Invalid IP octet: {octet} (must be 0-255)"
            )));
        }
    }

    let prefix: i64 = prefix
        .trim()
        .parse()
        .map_err(|_| invalid_format(&format!("invalid number '{prefix}'")))?;
    if !(i64::from(MIN_PREFIX)..=i64::from(MAX_PREFIX)).contains(&prefix) {
        return Err(OrchestratorError::validation(
            "VPC CIDR prefix must be between /16 and /28",
        ));
    }
    Ok(())
}

/// Check a network id as used in paths.
pub fn validate_vpc_id(vpc_id: &str) -> Result<(), OrchestratorError> {
    if vpc_id.is_empty() {
        return Err(OrchestratorError::validation("VPC ID is required"));
    }
    if !matches_pattern(VPC_ID_PATTERN, vpc_id)? {
        return Err(OrchestratorError::validation(
            "Invalid VPC ID format (expected: vpc-xxxxxxxx)",
        ));
    }
    Ok(())
}

/// Validate a create body, filling in `default_cidr_block` when the block is
/// omitted. Values are trimmed after validation.
pub fn validate_create_request(
    request: Option<&CreateNetworkRequest>,
    default_cidr_block: &str,
) -> Result<ValidatedCreate, OrchestratorError> {
    let Some(request) = request else {
        return Err(OrchestratorError::validation("Request body is required"));
    };
    let name = request.name.as_deref().unwrap_or_default();
    validate_name(name)?;
    let cidr_block = request.cidr_block.as_deref().unwrap_or(default_cidr_block);
    validate_cidr_block(cidr_block)?;
    Ok(ValidatedCreate {
        name: name.trim().to_string(),
        cidr_block: cidr_block.trim().to_string(),
    })
}

fn matches_pattern(pattern: &str, value: &str) -> Result<bool, OrchestratorError> {
    let regex = Regex::new(pattern)
        .map_err(|err| OrchestratorError::validation(format!("invalid pattern: {err}")))?;
    Ok(regex.is_match(value))
}

fn invalid_format(detail: &str) -> OrchestratorError {
    OrchestratorError::validation(format!("Invalid CIDR block format: {detail}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn message(result: Result<(), OrchestratorError>) -> String {
        match result {
            Err(OrchestratorError::Validation(message)) => message,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn accepts_valid_names() {
        let long = "a".repeat(255);
        for name in ["my-vpc", "vpc123", "test_vpc", "VPC-Test-123", "a", long.as_str()] {
            assert!(validate_name(name).is_ok(), "{name}");
        }
    }

    #[test]
    fn rejects_invalid_names() {
        assert_eq!(message(validate_name("")), "VPC name is required");
        assert_eq!(
            message(validate_name(&"a".repeat(256))),
            "VPC name must be 255 characters or less"
        );
        assert_eq!(
            message(validate_name("-vpc")),
            "VPC name must start with an alphanumeric character"
        );
        assert_eq!(
            message(validate_name("_vpc")),
            "VPC name must start with an alphanumeric character"
        );
        assert_eq!(
            message(validate_name("my vpc")),
            "VPC name can only contain alphanumeric characters, hyphens, and underscores"
        );
        assert_eq!(
            message(validate_name("vpc@test")),
            "VPC name can only contain alphanumeric characters, hyphens, and underscores"
        );
    }

    #[test]
    fn accepts_valid_blocks() {
        for block in ["10.0.0.0/16", "172.16.0.0/16", "192.168.0.0/24", "10.10.10.0/28"] {
            assert!(validate_cidr_block(block).is_ok(), "{block}");
        }
    }

    #[test]
    fn rejects_invalid_blocks() {
        assert_eq!(message(validate_cidr_block("")), "CIDR block is required");
        assert_eq!(
            message(validate_cidr_block("10.0.0.0")),
            "CIDR block must include a prefix (e.g., 10.0.0.0/16)"
        );
        assert_eq!(
            message(validate_cidr_block("10.0.0.0/15")),
            "VPC CIDR prefix must be between /16 and /28"
        );
        assert_eq!(
            message(validate_cidr_block("10.0.0.0/29")),
            "VPC CIDR prefix must be between /16 and /28"
        );
        assert_eq!(
            message(validate_cidr_block("256.0.0.0/16")),
            "Invalid IP octet: 256 (must be 0-255)"
        );
        assert_eq!(
            message(validate_cidr_block("10.0.0/16")),
            "CIDR block must have valid IPv4 address format"
        );
        assert_eq!(
            message(validate_cidr_block("invalid/16")),
            "CIDR block must have valid IPv4 address format"
        );
        assert!(message(validate_cidr_block("a.b.c.d/16")).starts_with("Invalid CIDR block format"));
        assert!(message(validate_cidr_block("10.0.0.0/1/6")).starts_with("Invalid CIDR block format"));
    }

    #[test]
    fn validates_vpc_ids() {
        for id in ["vpc-12345678", "vpc-1234567890abcdef", "vpc-0a1b2c3d4e5f60718"] {
            assert!(validate_vpc_id(id).is_ok(), "{id}");
        }
        assert_eq!(message(validate_vpc_id("")), "VPC ID is required");
        for id in ["vpc-", "vpc-ABCDEF12", "vpc-12345", "invalid"] {
            assert_eq!(
                message(validate_vpc_id(id)),
                "Invalid VPC ID format (expected: vpc-xxxxxxxx)",
                "{id}"
            );
        }
    }

    #[test]
    fn create_request_defaults_block_and_trims() {
        let request = CreateNetworkRequest {
            name: Some("test-vpc".to_string()),
            cidr_block: None,
        };
        let validated = validate_create_request(Some(&request), "10.0.0.0/16").expect("valid");
        assert_eq!(
            validated,
            ValidatedCreate {
                name: "test-vpc".to_string(),
                cidr_block: "10.0.0.0/16".to_string(),
            }
        );

        let err = validate_create_request(None, "10.0.0.0/16").unwrap_err();
        assert_eq!(err.to_string(), "Request body is required");

        let missing_name = CreateNetworkRequest::default();
        let err = validate_create_request(Some(&missing_name), "10.0.0.0/16").unwrap_err();
        assert_eq!(err.to_string(), "VPC name is required");
    }
}
