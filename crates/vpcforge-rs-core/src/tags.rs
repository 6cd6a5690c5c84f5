//! Tags applied to provisioned resources.

use chrono::{DateTime, SecondsFormat, Utc};
use vpcforge_rs_protocol::Tag;

pub const NAME_TAG: &str = "Name";
pub const MANAGED_BY_TAG: &str = "ManagedBy";
pub const RESOURCE_TYPE_TAG: &str = "ResourceType";
pub const CREATED_AT_TAG: &str = "CreatedAt";
pub const REQUEST_ID_TAG: &str = "RequestId";

/// Tag values shared by every resource of one creation.
#[derive(Debug, Clone)]
pub struct ResourceTags<'a> {
    pub name: &'a str,
    pub managed_by: &'a str,
    pub created_at: DateTime<Utc>,
    pub request_id: Option<&'a str>,
}

impl ResourceTags<'_> {
    /// Tags for one resource. `suffix` is appended to the network name for
    /// the `Name` tag (`None` for the network itself).
    pub fn for_resource(&self, suffix: Option<&str>, resource_type: &str) -> Vec<Tag> {
        let name = match suffix {
            Some(suffix) => format!("{}-{suffix}", self.name),
            None => self.name.to_string(),
        };
        let mut tags = vec![
            Tag::new(NAME_TAG, name),
            Tag::new(MANAGED_BY_TAG, self.managed_by),
            Tag::new(RESOURCE_TYPE_TAG, resource_type),
            Tag::new(
                CREATED_AT_TAG,
                self.created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            ),
        ];
        if let Some(request_id) = self.request_id {
            tags.push(Tag::new(REQUEST_ID_TAG, request_id));
        }
        tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn builds_named_tags() {
        let created_at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let tags = ResourceTags {
            name: "test-vpc-1",
            managed_by: "vpc-api",
            created_at,
            request_id: Some("req-1"),
        };
        assert_eq!(
            tags.for_resource(Some("igw"), "internet-gateway"),
            vec![
                Tag::new("Name", "test-vpc-1-igw"),
                Tag::new("ManagedBy", "vpc-api"),
                Tag::new("ResourceType", "internet-gateway"),
                Tag::new("CreatedAt", "2024-05-01T12:00:00Z"),
                Tag::new("RequestId", "req-1"),
            ]
        );
        let without_request = ResourceTags {
            request_id: None,
            ..tags
        };
        assert_eq!(without_request.for_resource(None, "vpc").len(), 4);
    }
}
