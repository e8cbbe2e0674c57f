//! Route table

/// Static access requirements of a route
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteMeta {
    /// Only reachable with an authenticated session
    pub requires_auth: bool,
    /// Only reachable without an authenticated session
    pub requires_guest: bool,
}

impl RouteMeta {
    const OPEN: Self = Self {
        requires_auth: false,
        requires_guest: false,
    };
    const AUTH: Self = Self {
        requires_auth: true,
        requires_guest: false,
    };
    const GUEST: Self = Self {
        requires_auth: false,
        requires_guest: true,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Register,
    AuthCallback,
    Dashboard,
    Profile,
    ApiKeys,
    Transactions,
    Usage,
    Playground,
    PlaygroundTts,
    PlaygroundStt,
    NotFound,
}

impl Route {
    /// Every route that has a path of its own
    pub const ALL: [Self; 11] = [
        Self::Login,
        Self::Register,
        Self::AuthCallback,
        Self::Dashboard,
        Self::Profile,
        Self::ApiKeys,
        Self::Transactions,
        Self::Usage,
        Self::Playground,
        Self::PlaygroundTts,
        Self::PlaygroundStt,
    ];

    /// Match a location (path, optionally with query and fragment) to a route
    pub fn recognize(location: &str) -> Self {
        let path = location
            .split(['?', '#'])
            .next()
            .unwrap_or_default();
        let path = match path.trim_end_matches('/') {
            "" => "/",
            trimmed => trimmed,
        };

        Self::ALL
            .into_iter()
            .find(|route| route.path() == path)
            .unwrap_or(Self::NotFound)
    }

    pub const fn path(self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Register => "/register",
            Self::AuthCallback => "/auth/callback",
            Self::Dashboard => "/",
            Self::Profile => "/profile",
            Self::ApiKeys => "/api-keys",
            Self::Transactions => "/transactions",
            Self::Usage => "/usage",
            Self::Playground => "/playground",
            Self::PlaygroundTts => "/playground/tts",
            Self::PlaygroundStt => "/playground/stt",
            Self::NotFound => "/404",
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Register => "register",
            Self::AuthCallback => "auth-callback",
            Self::Dashboard => "dashboard",
            Self::Profile => "profile",
            Self::ApiKeys => "api-keys",
            Self::Transactions => "transactions",
            Self::Usage => "usage",
            Self::Playground => "playground",
            Self::PlaygroundTts => "playground-tts",
            Self::PlaygroundStt => "playground-stt",
            Self::NotFound => "not-found",
        }
    }

    pub const fn meta(self) -> RouteMeta {
        match self {
            Self::Login | Self::Register => RouteMeta::GUEST,
            Self::AuthCallback | Self::Playground | Self::NotFound => RouteMeta::OPEN,
            Self::Dashboard
            | Self::Profile
            | Self::ApiKeys
            | Self::Transactions
            | Self::Usage
            | Self::PlaygroundTts
            | Self::PlaygroundStt => RouteMeta::AUTH,
        }
    }

    /// Route this one forwards to before any guard runs
    pub const fn redirect(self) -> Option<Self> {
        match self {
            Self::Playground => Some(Self::PlaygroundTts),
            _ => None,
        }
    }
}
