use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    Login,
    Signup,
    Dashboard,
    Campaigns,
    Analytics,
    Crm,
    Automation,
    Admin,
    Settings,
    Reports,
    Premium,
}

impl Route {
    /// Screens reachable from the sidebar, in display order.
    pub const NAVIGATION: [Route; 9] = [
        Self::Dashboard,
        Self::Campaigns,
        Self::Analytics,
        Self::Crm,
        Self::Automation,
        Self::Reports,
        Self::Admin,
        Self::Premium,
        Self::Settings,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Signup => "signup",
            Self::Dashboard => "dashboard",
            Self::Campaigns => "campaigns",
            Self::Analytics => "analytics",
            Self::Crm => "crm",
            Self::Automation => "automation",
            Self::Admin => "admin",
            Self::Settings => "settings",
            Self::Reports => "reports",
            Self::Premium => "premium",
        }
    }

    /// Unknown names fall back to the dashboard.
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "login" => Self::Login,
            "signup" => Self::Signup,
            "campaigns" => Self::Campaigns,
            "analytics" => Self::Analytics,
            "crm" => Self::Crm,
            "automation" => Self::Automation,
            "admin" => Self::Admin,
            "settings" => Self::Settings,
            "reports" => Self::Reports,
            "premium" => Self::Premium,
            _ => Self::Dashboard,
        }
    }

    pub fn is_public(self) -> bool {
        matches!(self, Self::Login | Self::Signup)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Login => "Sign In",
            Self::Signup => "Create Account",
            Self::Dashboard => "Dashboard",
            Self::Campaigns => "Campaigns",
            Self::Analytics => "Analytics",
            Self::Crm => "CRM & Leads",
            Self::Automation => "Automation",
            Self::Admin => "Admin",
            Self::Settings => "Settings",
            Self::Reports => "Reports",
            Self::Premium => "Premium",
        }
    }
}

/// Applies the navigation guard: signed-out users only see the public
/// screens, signed-in users never see them.
pub fn resolve(target: Route, authenticated: bool) -> Route {
    match (authenticated, target.is_public()) {
        (false, false) => Route::Login,
        (true, true) => Route::Dashboard,
        _ => target,
    }
}
