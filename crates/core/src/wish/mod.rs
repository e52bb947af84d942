use tracing::warn;

use crate::Result;

/// Fixed celebratory line substituted whenever the provider fails.
pub const FALLBACK_WISH: &str = "Happy birthday! May all your dreams come true!";

/// Capability boundary to the short-text generation service.
///
/// Modelled as a trait so the real service can be swapped for a canned
/// implementation in demos and tests.
pub trait WishProvider {
    fn fetch_wish(&self, name: &str) -> Result<String>;
}

/// Deterministic in-process provider. `{name}` in the template is replaced
/// with the celebrant's name.
#[derive(Debug, Clone)]
pub struct CannedWish {
    template: String,
}

impl CannedWish {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }
}

impl Default for CannedWish {
    fn default() -> Self {
        Self::new("Happy birthday, {name}! Wishing you a magical day!")
    }
}

impl WishProvider for CannedWish {
    fn fetch_wish(&self, name: &str) -> Result<String> {
        Ok(self.template.replace("{name}", name))
    }
}

/// Resolves a wish through the provider. Provider failures are logged and
/// swallowed into [`FALLBACK_WISH`]; no error ever crosses this boundary.
pub fn resolve_wish(provider: &dyn WishProvider, name: &str) -> String {
    match provider.fetch_wish(name) {
        Ok(wish) => wish,
        Err(error) => {
            warn!(%error, "wish provider failed, using fallback");
            FALLBACK_WISH.to_string()
        }
    }
}
