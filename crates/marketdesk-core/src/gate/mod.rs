//! Permission gate: classify the session against a page's requirements.
//!
//! `evaluate` is a pure function of the session status, the page's declared
//! requirements, and the current route. Only the session is cached; the
//! decision is recomputed on every call.

mod decision;

#[cfg(test)]
mod tests;

pub use decision::{Decision, DecisionKind, Denial, GateAction, GateRoutes, NavigationTarget};

use crate::{
    error::ErrorCode,
    session::{Role, SessionStatus, UserType},
};

///
/// GateRequirements
///
/// What a page demands of the session. Both constraints are optional.
///

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct GateRequirements {
    pub required_role: Option<Role>,
    pub required_user_type: Option<UserType>,
}

impl GateRequirements {
    /// Any signed-in, set-up user.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            required_role: None,
            required_user_type: None,
        }
    }

    #[must_use]
    pub const fn role(role: Role) -> Self {
        Self::none().with_role(role)
    }

    #[must_use]
    pub const fn user_type(user_type: UserType) -> Self {
        Self::none().with_user_type(user_type)
    }

    #[must_use]
    pub const fn with_role(mut self, role: Role) -> Self {
        self.required_role = Some(role);
        self
    }

    #[must_use]
    pub const fn with_user_type(mut self, user_type: UserType) -> Self {
        self.required_user_type = Some(user_type);
        self
    }
}

/// Classify the session. First matching rule wins:
/// checking, error, unauthorized, forbidden (role), forbidden (user type),
/// needs setup, authorized.
#[must_use]
pub fn evaluate(
    status: &SessionStatus,
    requirements: &GateRequirements,
    route: &str,
    setup_route: &str,
) -> Decision {
    let user = match status {
        SessionStatus::Checking => return Decision::Checking,
        SessionStatus::Failed(err) => {
            return Decision::Error(Denial::new(
                ErrorCode::AuthError,
                "Não foi possível verificar sua sessão. Tente novamente.",
                Some(err.to_string()),
            ));
        }
        SessionStatus::Ready(None) => {
            return Decision::Unauthorized(Denial::new(
                ErrorCode::NoUser,
                "Você precisa entrar para acessar esta página.",
                None,
            ));
        }
        SessionStatus::Ready(Some(user)) => user,
    };

    if let Some(required) = requirements.required_role
        && user.role != required
    {
        return Decision::Forbidden(Denial::new(
            ErrorCode::InsufficientRole,
            "Você não tem permissão para acessar esta página.",
            Some(format!(
                "expected role '{required}', found '{}'",
                user.role
            )),
        ));
    }

    if let Some(required) = requirements.required_user_type
        && user.user_type != required
    {
        return Decision::Forbidden(Denial::new(
            ErrorCode::InsufficientUserType,
            "Esta página é exclusiva para outro tipo de conta.",
            Some(format!(
                "expected user_type '{required}', found '{}'",
                user.user_type
            )),
        ));
    }

    if user.user_type == UserType::Indefinido && !same_route(route, setup_route) {
        return Decision::NeedsSetup {
            redirect_to: setup_route.to_string(),
            denial: Denial::new(
                ErrorCode::UserSetupRequired,
                "Conclua seu cadastro escolhendo o tipo de conta.",
                None,
            ),
        };
    }

    Decision::Authorized(user.clone())
}

/// Compare route paths ignoring query string, trailing slash, and ASCII case.
fn same_route(route: &str, other: &str) -> bool {
    fn normalize(route: &str) -> &str {
        let path = route.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        if trimmed.is_empty() { "/" } else { trimmed }
    }

    normalize(route).eq_ignore_ascii_case(normalize(other))
}
