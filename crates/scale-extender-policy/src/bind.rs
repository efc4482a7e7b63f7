//! Bind policy.

use scale_extender_core::ExtenderBindingArgs;
use tracing::warn;

use crate::error::{PolicyError, Result};

/// How bind callbacks are answered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BindPolicy {
    /// Never bind; the scheduler should bind on its own.
    #[default]
    Decline,
}

impl BindPolicy {
    /// Handle a bind callback.
    ///
    /// # Errors
    ///
    /// [`BindPolicy::Decline`] always returns [`PolicyError::BindUnsupported`].
    pub fn bind(&self, args: &ExtenderBindingArgs) -> Result<()> {
        match self {
            Self::Decline => {
                warn!(
                    pod = %args.pod_name,
                    namespace = %args.pod_namespace,
                    node = %args.node,
                    "Declining bind request"
                );
                Err(PolicyError::BindUnsupported)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decline_always_errors() {
        let args = ExtenderBindingArgs {
            pod_name: "web-0".into(),
            pod_namespace: "default".into(),
            pod_uid: "uid-1".into(),
            node: "n1".into(),
        };

        let err = BindPolicy::Decline.bind(&args).unwrap_err();
        assert!(matches!(err, PolicyError::BindUnsupported));
        assert!(err.to_string().contains("doesn't support Bind"));

        // Empty arguments are declined the same way.
        assert!(BindPolicy::default()
            .bind(&ExtenderBindingArgs::default())
            .is_err());
    }
}
