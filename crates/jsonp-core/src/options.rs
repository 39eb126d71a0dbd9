use std::fmt;

use serde::de::{self, value::MapAccessDeserializer, MapAccess};
use serde::{Deserialize, Deserializer, Serialize};

use crate::OptionsError;

/// What the executor does with an operation whose `op` it does not recognize.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownOpPolicy {
    /// Skip the operation and carry on (default).
    #[default]
    Ignore,
    /// Fail the patch with [`PatchError::UnknownOp`](crate::PatchError::UnknownOp).
    Reject,
}

/// Configuration passed to patch application.
///
/// Deserializes from a camel-cased map, which is how the CLI accepts it.
/// Sequences are rejected and the result is validated, so every
/// `PatchOptions` in existence satisfies [`PatchOptions::validate`]:
///
/// ```
/// # use jsonp_core::{PatchOptions, UnknownOpPolicy};
/// let opts: PatchOptions =
///     serde_json::from_str(r#"{"unknownOps":"reject","maxPathDepth":8}"#)?;
/// assert_eq!(opts.unknown_ops(), UnknownOpPolicy::Reject);
/// assert_eq!(opts.max_path_depth(), Some(8));
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchOptions {
    unknown_ops: UnknownOpPolicy,
    max_path_depth: Option<usize>,
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
struct RawOptions {
    unknown_ops: UnknownOpPolicy,
    max_path_depth: Option<usize>,
}

impl<'de> Deserialize<'de> for PatchOptions {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct Visitor;

        impl<'de> de::Visitor<'de> for Visitor {
            type Value = PatchOptions;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of patch options")
            }

            fn visit_map<A>(self, map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let raw = RawOptions::deserialize(MapAccessDeserializer::new(map))?;
                let options = PatchOptions { unknown_ops: raw.unknown_ops, max_path_depth: raw.max_path_depth };
                options.validate().map_err(de::Error::custom)?;
                Ok(options)
            }
        }

        deserializer.deserialize_map(Visitor)
    }
}

impl PatchOptions {
    /// Returns the policy for unrecognized operations.
    #[must_use]
    pub fn unknown_ops(&self) -> UnknownOpPolicy {
        self.unknown_ops
    }

    /// Returns the maximum number of tokens a decoded path may have.
    ///
    /// ```
    /// # use jsonp_core::PatchOptions;
    /// assert_eq!(PatchOptions::default().max_path_depth(), None);
    /// ```
    #[must_use]
    pub fn max_path_depth(&self) -> Option<usize> {
        self.max_path_depth
    }

    /// Sets the policy for unrecognized operations.
    ///
    /// ```
    /// # use jsonp_core::{PatchOptions, UnknownOpPolicy};
    /// let opts = PatchOptions::default()
    ///     .with_unknown_op_policy(UnknownOpPolicy::Reject)
    ///     .expect("set policy");
    /// assert_eq!(opts.unknown_ops(), UnknownOpPolicy::Reject);
    /// ```
    pub fn with_unknown_op_policy(mut self, policy: UnknownOpPolicy) -> Result<Self, OptionsError> {
        self.unknown_ops = policy;
        self.validate()?;
        Ok(self)
    }

    /// Limits how deep `path` and `from` pointers may reach.
    ///
    /// ```
    /// # use jsonp_core::{OptionsError, PatchOptions};
    /// assert_eq!(PatchOptions::default().with_max_path_depth(0), Err(OptionsError::ZeroMaxDepth));
    /// ```
    pub fn with_max_path_depth(mut self, depth: usize) -> Result<Self, OptionsError> {
        self.max_path_depth = Some(depth);
        self.validate()?;
        Ok(self)
    }

    /// Checks the invariants the builders and `Deserialize` enforce.
    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.max_path_depth == Some(0) {
            return Err(OptionsError::ZeroMaxDepth);
        }
        Ok(())
    }
}

impl fmt::Display for UnknownOpPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnknownOpPolicy::Ignore => f.write_str("ignore"),
            UnknownOpPolicy::Reject => f.write_str("reject"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_lenient() {
        let opts = PatchOptions::default();
        assert_eq!(opts.unknown_ops(), UnknownOpPolicy::Ignore);
        assert_eq!(opts.max_path_depth(), None);
    }

    #[test]
    fn zero_depth_is_rejected() {
        let err = PatchOptions::default().with_max_path_depth(0).unwrap_err();
        assert_eq!(err, OptionsError::ZeroMaxDepth);
        let err = serde_json::from_str::<PatchOptions>(r#"{"maxPathDepth":0}"#).unwrap_err();
        assert!(err.to_string().contains("max path depth must be at least 1"), "{err}");
    }

    #[test]
    fn sequences_are_rejected() {
        for input in ["[]", r#"["reject",0]"#, r#"["reject",4]"#] {
            let err = serde_json::from_str::<PatchOptions>(input).unwrap_err();
            assert!(err.to_string().contains("a map of patch options"), "{input}: {err}");
        }
        assert!(serde_yaml::from_str::<PatchOptions>("- reject\n- 4\n").is_err());
    }

    #[test]
    fn yaml_maps_are_accepted() {
        let parsed: PatchOptions = serde_yaml::from_str("unknownOps: reject\nmaxPathDepth: 3\n").unwrap();
        assert_eq!(parsed.unknown_ops(), UnknownOpPolicy::Reject);
        assert_eq!(parsed.max_path_depth(), Some(3));
    }

    #[test]
    fn missing_fields_take_defaults() {
        let parsed: PatchOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed, PatchOptions::default());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(serde_json::from_str::<PatchOptions>(r#"{"arrayMode":"set"}"#).is_err());
    }

    #[test]
    fn policy_display_matches_serde_names() {
        for policy in [UnknownOpPolicy::Ignore, UnknownOpPolicy::Reject] {
            let json = serde_json::to_string(&policy).unwrap();
            assert_eq!(json, format!("\"{policy}\""));
        }
    }
}
