//! Application metadata and role permissions supplied by the app layer.

use hexdesk_types::session::Role;

use crate::geometry::Size;

/// Presentation metadata for an app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppMeta {
    pub display_name: String,
    /// Preferred window size on desktop layouts. `None` uses the manager's
    /// configured default.
    pub default_size: Option<Size>,
}

/// Answers "what is this app" and "may this role open it".
pub trait AppRegistry {
    fn metadata(&self, app_id: &str) -> Option<AppMeta>;

    fn is_allowed(&self, app_id: &str, role: Role) -> bool;
}

/// One row of a [`StaticAppRegistry`].
#[derive(Debug, Clone)]
pub struct AppSpec {
    pub id: &'static str,
    pub display_name: &'static str,
    pub default_size: Option<Size>,
    /// Roles allowed to open the app. Empty means everyone.
    pub roles: &'static [Role],
}

/// A fixed table of apps. Unknown ids are never allowed.
#[derive(Debug, Clone)]
pub struct StaticAppRegistry {
    apps: Vec<AppSpec>,
}

const ELEVATED: &[Role] = &[Role::Admin];
const STAFF: &[Role] = &[Role::Recruiter, Role::Admin];
const EVERYONE: &[Role] = &[];

fn app(
    id: &'static str,
    display_name: &'static str,
    size: Option<(i32, i32)>,
    roles: &'static [Role],
) -> AppSpec {
    AppSpec {
        id,
        display_name,
        default_size: size.map(|(w, h)| Size::new(w, h)),
        roles,
    }
}

impl StaticAppRegistry {
    pub fn new(apps: Vec<AppSpec>) -> Self {
        Self { apps }
    }

    /// The stock hexdesk app catalog.
    pub fn builtin() -> Self {
        Self::new(vec![
            app("terminal", "Terminal", Some((720, 440)), EVERYONE),
            app("files", "File Manager", Some((760, 500)), EVERYONE),
            app("resume", "Resume", Some((680, 760)), EVERYONE),
            app("projects", "Projects", None, EVERYONE),
            app("wireshark", "Packet Capture", Some((900, 560)), EVERYONE),
            app("logs", "Log Viewer", Some((820, 480)), EVERYONE),
            app("quests", "Quest Log", Some((520, 600)), EVERYONE),
            app("settings", "Settings", Some((560, 420)), EVERYONE),
            app("contact", "Contact", Some((480, 420)), STAFF),
            app("admin-console", "Admin Console", Some((860, 600)), ELEVATED),
        ])
    }

    fn find(&self, app_id: &str) -> Option<&AppSpec> {
        self.apps.iter().find(|a| a.id == app_id)
    }
}

impl AppRegistry for StaticAppRegistry {
    fn metadata(&self, app_id: &str) -> Option<AppMeta> {
        self.find(app_id).map(|spec| AppMeta {
            display_name: spec.display_name.to_string(),
            default_size: spec.default_size,
        })
    }

    fn is_allowed(&self, app_id: &str, role: Role) -> bool {
        self.find(app_id)
            .is_some_and(|spec| spec.roles.is_empty() || spec.roles.contains(&role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_apps_open_for_everyone() {
        let reg = StaticAppRegistry::builtin();
        for role in [Role::Guest, Role::Recruiter, Role::Admin] {
            assert!(reg.is_allowed("terminal", role));
        }
    }

    #[test]
    fn admin_console_requires_admin() {
        let reg = StaticAppRegistry::builtin();
        assert!(!reg.is_allowed("admin-console", Role::Guest));
        assert!(!reg.is_allowed("admin-console", Role::Recruiter));
        assert!(reg.is_allowed("admin-console", Role::Admin));
    }

    #[test]
    fn unknown_app_is_denied() {
        let reg = StaticAppRegistry::builtin();
        assert!(!reg.is_allowed("solitaire", Role::Admin));
        assert!(reg.metadata("solitaire").is_none());
    }

    #[test]
    fn metadata_carries_display_name() {
        let meta = StaticAppRegistry::builtin().metadata("wireshark").unwrap();
        assert_eq!(meta.display_name, "Packet Capture");
        assert_eq!(meta.default_size, Some(Size::new(900, 560)));
    }
}
