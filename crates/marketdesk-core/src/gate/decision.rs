use crate::{
    error::{Error, ErrorCode, ErrorOrigin},
    session::SessionUser,
};
use derive_more::Display;

///
/// Denial
///
/// Why the gate refused: a stable code, a localized message, and optional
/// diagnostic detail (expected vs actual, upstream error).
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Denial {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<String>,
}

impl Denial {
    pub(crate) fn new(code: ErrorCode, message: &str, details: Option<String>) -> Self {
        Self {
            code,
            message: message.to_string(),
            details,
        }
    }
}

impl From<Denial> for Error {
    fn from(denial: Denial) -> Self {
        let err = Self::new(denial.code, ErrorOrigin::Gate, denial.message);
        match denial.details {
            Some(details) => err.with_details(details),
            None => err,
        }
    }
}

///
/// DecisionKind
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum DecisionKind {
    #[display("checking")]
    Checking,

    #[display("error")]
    Error,

    #[display("unauthorized")]
    Unauthorized,

    #[display("forbidden")]
    Forbidden,

    #[display("needs_setup")]
    NeedsSetup,

    #[display("authorized")]
    Authorized,
}

///
/// GateAction
///
/// Actions a full-screen denial offers the user.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum GateAction {
    #[display("retry")]
    Retry,

    #[display("login")]
    Login,

    #[display("go_home")]
    GoHome,

    #[display("logout")]
    Logout,

    #[display("redirect")]
    Redirect,
}

///
/// GateRoutes
///
/// Where the login and home actions lead.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct GateRoutes<'a> {
    pub home: &'a str,
    pub login: &'a str,
}

///
/// NavigationTarget
///
/// Route a denial action navigates to. `return_to` is the page the user was
/// turned away from, so login can send them back.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NavigationTarget {
    pub path: String,
    pub return_to: Option<String>,
}

impl NavigationTarget {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            return_to: None,
        }
    }

    #[must_use]
    pub fn returning_to(mut self, route: impl Into<String>) -> Self {
        self.return_to = Some(route.into());
        self
    }
}

///
/// Decision
///
/// Outcome of one gate evaluation. Every outcome other than `Authorized`
/// is terminal for the guarded subtree; `Checking` is the only non-final one.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Decision {
    Checking,
    Error(Denial),
    Unauthorized(Denial),
    Forbidden(Denial),
    NeedsSetup { redirect_to: String, denial: Denial },
    Authorized(SessionUser),
}

impl Decision {
    #[must_use]
    pub const fn kind(&self) -> DecisionKind {
        match self {
            Self::Checking => DecisionKind::Checking,
            Self::Error(_) => DecisionKind::Error,
            Self::Unauthorized(_) => DecisionKind::Unauthorized,
            Self::Forbidden(_) => DecisionKind::Forbidden,
            Self::NeedsSetup { .. } => DecisionKind::NeedsSetup,
            Self::Authorized(_) => DecisionKind::Authorized,
        }
    }

    #[must_use]
    pub const fn denial(&self) -> Option<&Denial> {
        match self {
            Self::Error(denial)
            | Self::Unauthorized(denial)
            | Self::Forbidden(denial)
            | Self::NeedsSetup { denial, .. } => Some(denial),
            Self::Checking | Self::Authorized(_) => None,
        }
    }

    #[must_use]
    pub fn code(&self) -> Option<ErrorCode> {
        self.denial().map(|denial| denial.code)
    }

    #[must_use]
    pub const fn is_authorized(&self) -> bool {
        matches!(self, Self::Authorized(_))
    }

    #[must_use]
    pub const fn is_final(&self) -> bool {
        !matches!(self, Self::Checking)
    }

    #[must_use]
    pub const fn user(&self) -> Option<&SessionUser> {
        match self {
            Self::Authorized(user) => Some(user),
            _ => None,
        }
    }

    /// Route the client should navigate to, if any.
    #[must_use]
    pub fn redirect(&self) -> Option<&str> {
        match self {
            Self::NeedsSetup { redirect_to, .. } => Some(redirect_to),
            _ => None,
        }
    }

    /// Actions offered on the denial screen, primary first.
    #[must_use]
    pub const fn actions(&self) -> &'static [GateAction] {
        match self {
            Self::Checking | Self::Authorized(_) => &[],
            Self::Error(_) => &[GateAction::Retry, GateAction::Logout],
            Self::Unauthorized(_) => &[GateAction::Login],
            Self::Forbidden(_) => &[GateAction::GoHome, GateAction::Logout],
            Self::NeedsSetup { .. } => &[GateAction::Redirect],
        }
    }

    /// Where `action` leads from a denial on `route`. `None` when the action
    /// is not offered by this decision or does not navigate (retry, logout).
    #[must_use]
    pub fn target(
        &self,
        action: GateAction,
        route: &str,
        routes: GateRoutes<'_>,
    ) -> Option<NavigationTarget> {
        if !self.actions().contains(&action) {
            return None;
        }

        match action {
            GateAction::Login => Some(NavigationTarget::new(routes.login).returning_to(route)),
            GateAction::GoHome => Some(NavigationTarget::new(routes.home)),
            GateAction::Redirect => self.redirect().map(NavigationTarget::new),
            GateAction::Retry | GateAction::Logout => None,
        }
    }

    /// `None` while checking; otherwise the authorized user or the denial as an error.
    pub fn into_result(self) -> Option<Result<SessionUser, Error>> {
        match self {
            Self::Checking => None,
            Self::Authorized(user) => Some(Ok(user)),
            Self::Error(denial)
            | Self::Unauthorized(denial)
            | Self::Forbidden(denial)
            | Self::NeedsSetup { denial, .. } => Some(Err(denial.into())),
        }
    }
}
