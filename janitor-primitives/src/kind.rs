//! Resource kind discriminator.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Kind of cloud resource. Rules use it to skip resources outside their
/// jurisdiction.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ResourceType {
    /// Compute instance.
    Instance,
    /// Block storage volume.
    Volume,
    /// Volume snapshot.
    Snapshot,
    /// Machine image.
    Image,
    /// Launch configuration used by auto scaling groups.
    LaunchConfig,
    /// Auto scaling group.
    Asg,
    /// Provider specific kind not modelled above, stored lowercase.
    Other(String),
}

impl ResourceType {
    /// Returns the canonical lowercase label for the kind.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Instance => "instance",
            Self::Volume => "volume",
            Self::Snapshot => "snapshot",
            Self::Image => "image",
            Self::LaunchConfig => "launch_config",
            Self::Asg => "asg",
            Self::Other(label) => label,
        }
    }

    /// Returns `true` for compute instances.
    #[must_use]
    pub fn is_instance(&self) -> bool {
        matches!(self, Self::Instance)
    }
}

impl Display for ResourceType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim().to_ascii_lowercase();
        let kind = match label.as_str() {
            "" => {
                return Err(Error::InvalidResourceType {
                    label: s.to_owned(),
                });
            }
            "instance" => Self::Instance,
            "volume" | "ebs_volume" => Self::Volume,
            "snapshot" | "ebs_snapshot" => Self::Snapshot,
            "image" => Self::Image,
            "launch_config" => Self::LaunchConfig,
            "asg" => Self::Asg,
            _ => Self::Other(label),
        };
        Ok(kind)
    }
}

impl TryFrom<String> for ResourceType {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ResourceType> for String {
    fn from(value: ResourceType) -> Self {
        match value {
            ResourceType::Other(label) => label,
            other => other.as_str().to_owned(),
        }
    }
}
