//! Multitexture capability probing
//!
//! Multitexturing is core in GL 1.3 and an ARB extension on top of 1.2.1.
//! Probing walks those tiers in order and loads the first one satisfied.
//! When the entry points are already resolved nothing is queried again.

use super::context::RenderContext;

/// Version string for core multitexture support
pub const GL_VERSION_1_3: &str = "GL_VERSION_1_3";
/// Version string for the 1.2 base required by the ARB tier
pub const GL_VERSION_1_2: &str = "GL_VERSION_1_2";
/// Multitexture extension string
pub const GL_ARB_MULTITEXTURE: &str = "GL_ARB_multitexture";

/// Outcome of loading multitexture entry points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultitextureSupport {
    /// Entry points were already resolved; nothing was queried
    AlreadyResolved,
    /// Loaded through core GL 1.3
    Core13,
    /// Loaded through GL 1.2 plus `GL_ARB_multitexture`
    Arb121,
    /// Neither tier is available; single-texture rendering only
    Unavailable,
}

impl MultitextureSupport {
    /// Whether multiple units may be used
    pub fn is_available(self) -> bool {
        !matches!(self, MultitextureSupport::Unavailable)
    }
}

/// Resolve multitexture entry points once per context
pub fn load_multitexturing(context: &mut dyn RenderContext) -> MultitextureSupport {
    if context.multitexture_resolved() {
        return MultitextureSupport::AlreadyResolved;
    }

    let support = if context.extension_supported(GL_VERSION_1_3) {
        context.load_extension(GL_VERSION_1_3);
        MultitextureSupport::Core13
    } else if context.extension_supported(GL_VERSION_1_2)
        && context.extension_supported(GL_ARB_MULTITEXTURE)
    {
        context.load_extension(GL_VERSION_1_2);
        context.load_core_promoted_extension(GL_ARB_MULTITEXTURE);
        MultitextureSupport::Arb121
    } else {
        MultitextureSupport::Unavailable
    };

    match support {
        MultitextureSupport::Unavailable => {
            log::debug!("Multitexturing unavailable, falling back to single-texture rendering")
        }
        _ => log::info!("Multitexturing loaded via {:?}", support),
    }
    support
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ContextSettings;
    use crate::render::headless::{GlCall, HeadlessContext};

    fn context(version: (u32, u32), extensions: &[&str]) -> HeadlessContext {
        HeadlessContext::new(&ContextSettings {
            gl_version: version,
            extensions: extensions.iter().map(|e| e.to_string()).collect(),
            ..ContextSettings::default()
        })
    }

    #[test]
    fn test_core_tier_preferred() {
        let mut ctx = context((2, 1), &[GL_ARB_MULTITEXTURE]);
        let support = load_multitexturing(&mut ctx);
        assert_eq!(support, MultitextureSupport::Core13);
        assert!(support.is_available());
        assert!(ctx.multitexture_resolved());
        assert_eq!(ctx.loaded_extensions(), [GL_VERSION_1_3.to_string()]);
    }

    #[test]
    fn test_arb_tier() {
        let mut ctx = context((1, 2), &[GL_ARB_MULTITEXTURE]);
        assert_eq!(load_multitexturing(&mut ctx), MultitextureSupport::Arb121);
        assert!(ctx.multitexture_resolved());
        assert_eq!(
            ctx.loaded_extensions(),
            [GL_VERSION_1_2.to_string(), GL_ARB_MULTITEXTURE.to_string()]
        );
    }

    #[test]
    fn test_version_1_2_without_extension_is_unavailable() {
        let mut ctx = context((1, 2), &[]);
        let support = load_multitexturing(&mut ctx);
        assert_eq!(support, MultitextureSupport::Unavailable);
        assert!(!support.is_available());
        assert!(!ctx.multitexture_resolved());
        assert!(ctx.loaded_extensions().is_empty());
    }

    #[test]
    fn test_second_load_is_skipped() {
        let mut ctx = context((1, 4), &[]);
        assert_eq!(load_multitexturing(&mut ctx), MultitextureSupport::Core13);
        ctx.clear_journal();

        let support = load_multitexturing(&mut ctx);
        assert_eq!(support, MultitextureSupport::AlreadyResolved);
        assert!(support.is_available());
        assert!(!ctx
            .journal()
            .iter()
            .any(|call| matches!(call, GlCall::LoadExtension(_))));
        assert_eq!(ctx.loaded_extensions().len(), 1);
    }
}
