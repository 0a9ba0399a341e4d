use super::*;
use crate::{
    platform::PlatformError,
    session::{SessionError, SessionUser},
    test_fixtures::{admin, cliente, indefinido, prestador},
};
use proptest::prelude::*;

const SETUP: &str = "/selecionar-tipo";
const ROUTES: GateRoutes<'static> = GateRoutes {
    home: "/",
    login: "/login",
};

fn ready(user: SessionUser) -> SessionStatus {
    SessionStatus::Ready(Some(user))
}

fn decide(status: &SessionStatus, requirements: GateRequirements, route: &str) -> Decision {
    evaluate(status, &requirements, route, SETUP)
}

#[test]
fn checking_comes_first() {
    let decision = decide(&SessionStatus::Checking, GateRequirements::role(Role::Admin), "/");

    assert_eq!(decision, Decision::Checking);
    assert!(!decision.is_final());
    assert!(decision.into_result().is_none());
}

#[test]
fn fetch_failure_is_an_auth_error_with_details() {
    let status = SessionStatus::Failed(SessionError::Fetch {
        attempts: 3,
        source: PlatformError::unavailable("timeout"),
    });
    let decision = decide(&status, GateRequirements::none(), "/");

    assert_eq!(decision.kind(), DecisionKind::Error);
    assert_eq!(decision.code(), Some(ErrorCode::AuthError));
    let details = decision
        .denial()
        .and_then(|d| d.details.clone())
        .expect("auth error should carry details");
    assert!(details.contains("timeout"));
    assert_eq!(decision.actions()[0], GateAction::Retry);
}

#[test]
fn absent_session_is_unauthorized() {
    let decision = decide(&SessionStatus::Ready(None), GateRequirements::none(), "/");

    assert_eq!(decision.kind(), DecisionKind::Unauthorized);
    assert_eq!(decision.code(), Some(ErrorCode::NoUser));
    assert_eq!(decision.actions(), &[GateAction::Login]);
}

#[test]
fn role_mismatch_is_forbidden_with_expected_and_actual() {
    let decision = decide(&ready(cliente()), GateRequirements::role(Role::Admin), "/admin");

    assert_eq!(decision.kind(), DecisionKind::Forbidden);
    assert_eq!(decision.code(), Some(ErrorCode::InsufficientRole));
    let details = decision.denial().and_then(|d| d.details.as_deref());
    assert_eq!(details, Some("expected role 'admin', found 'user'"));
}

#[test]
fn prestador_on_a_cliente_page_is_forbidden_by_user_type() {
    let decision = decide(
        &ready(prestador()),
        GateRequirements::user_type(UserType::Cliente),
        "/minhas-reservas",
    );

    assert_eq!(decision.kind(), DecisionKind::Forbidden);
    assert_eq!(decision.code(), Some(ErrorCode::InsufficientUserType));
    let details = decision
        .denial()
        .and_then(|d| d.details.clone())
        .expect("user type denial should carry details");
    assert!(details.contains("cliente"));
    assert!(details.contains("prestador"));
}

#[test]
fn role_is_checked_before_user_type() {
    let decision = decide(
        &ready(prestador()),
        GateRequirements::role(Role::Admin).with_user_type(UserType::Cliente),
        "/",
    );

    assert_eq!(decision.code(), Some(ErrorCode::InsufficientRole));
}

#[test]
fn incomplete_onboarding_redirects_to_setup() {
    let decision = decide(&ready(indefinido()), GateRequirements::none(), "/painel");

    assert_eq!(decision.kind(), DecisionKind::NeedsSetup);
    assert_eq!(decision.code(), Some(ErrorCode::UserSetupRequired));
    assert_eq!(decision.redirect(), Some(SETUP));
    assert_eq!(decision.actions(), &[GateAction::Redirect]);
}

#[test]
fn setup_route_itself_is_reachable_before_onboarding() {
    for route in [SETUP, "/selecionar-tipo/", "/Selecionar-Tipo?next=/painel"] {
        let decision = decide(&ready(indefinido()), GateRequirements::none(), route);
        assert!(decision.is_authorized(), "route {route} should be allowed");
    }
}

#[test]
fn authorized_exposes_the_user() {
    let decision = decide(&ready(admin()), GateRequirements::role(Role::Admin), "/admin");

    assert_eq!(decision.user(), Some(&admin()));
    assert!(decision.actions().is_empty());
    assert_eq!(decision.into_result(), Some(Ok(admin())));
}

#[test]
fn denial_converts_into_a_gate_error() {
    let decision = decide(&ready(cliente()), GateRequirements::role(Role::Admin), "/admin");
    let err = decision
        .into_result()
        .and_then(Result::err)
        .expect("forbidden should convert into an error");

    assert_eq!(err.code, ErrorCode::InsufficientRole);
    assert_eq!(err.origin, crate::ErrorOrigin::Gate);
    assert!(err.details.is_some());
}

#[test]
fn login_action_returns_to_the_guarded_page() {
    let decision = decide(&SessionStatus::Ready(None), GateRequirements::none(), "/reservas?id=7");

    assert_eq!(
        decision.target(GateAction::Login, "/reservas?id=7", ROUTES),
        Some(NavigationTarget::new("/login").returning_to("/reservas?id=7"))
    );
    assert_eq!(decision.target(GateAction::GoHome, "/reservas?id=7", ROUTES), None);
}

#[test]
fn forbidden_actions_lead_home_or_nowhere() {
    let decision = decide(&ready(prestador()), GateRequirements::user_type(UserType::Cliente), "/reservas");

    assert_eq!(
        decision.target(GateAction::GoHome, "/reservas", ROUTES),
        Some(NavigationTarget::new("/"))
    );
    assert_eq!(decision.target(GateAction::Logout, "/reservas", ROUTES), None);
    assert_eq!(decision.target(GateAction::Login, "/reservas", ROUTES), None);
}

#[test]
fn setup_redirect_targets_the_setup_route() {
    let decision = decide(&ready(indefinido()), GateRequirements::none(), "/painel");

    assert_eq!(
        decision.target(GateAction::Redirect, "/painel", ROUTES),
        Some(NavigationTarget::new(SETUP))
    );
}

///
/// PROPERTIES
///

fn arb_role() -> impl Strategy<Value = Role> {
    prop_oneof![Just(Role::Admin), Just(Role::User)]
}

fn arb_set_up_type() -> impl Strategy<Value = UserType> {
    prop_oneof![Just(UserType::Cliente), Just(UserType::Prestador)]
}

fn arb_user_type() -> impl Strategy<Value = UserType> {
    prop_oneof![
        Just(UserType::Cliente),
        Just(UserType::Prestador),
        Just(UserType::Indefinido)
    ]
}

fn arb_route() -> impl Strategy<Value = String> {
    "/[a-z]{1,12}".prop_filter("must differ from the setup route", |r| r != SETUP)
}

fn user(role: Role, user_type: UserType) -> SessionUser {
    SessionUser::new("u1", "u1@example.com")
        .with_role(role)
        .with_user_type(user_type)
}

proptest! {
    #[test]
    fn admins_pass_admin_pages(user_type in arb_set_up_type(), route in arb_route()) {
        let decision = decide(
            &ready(user(Role::Admin, user_type)),
            GateRequirements::role(Role::Admin),
            &route,
        );

        prop_assert!(decision.is_authorized());
    }

    #[test]
    fn role_mismatch_is_always_insufficient_role(
        actual in arb_role(),
        required in arb_role(),
        user_type in arb_user_type(),
        required_type in proptest::option::of(arb_user_type()),
        route in arb_route(),
    ) {
        prop_assume!(actual != required);
        let mut requirements = GateRequirements::role(required);
        requirements.required_user_type = required_type;

        let decision = decide(&ready(user(actual, user_type)), requirements, &route);

        prop_assert_eq!(decision.kind(), DecisionKind::Forbidden);
        prop_assert_eq!(decision.code(), Some(ErrorCode::InsufficientRole));
    }

    #[test]
    fn indefinido_off_the_setup_route_needs_setup(
        role in arb_role(),
        require_own_role in any::<bool>(),
        route in arb_route(),
    ) {
        let requirements = if require_own_role {
            GateRequirements::role(role)
        } else {
            GateRequirements::none()
        };

        let decision = decide(&ready(user(role, UserType::Indefinido)), requirements, &route);

        prop_assert_eq!(decision.kind(), DecisionKind::NeedsSetup);
        prop_assert_eq!(decision.redirect(), Some(SETUP));
    }

    #[test]
    fn evaluation_is_pure(
        role in arb_role(),
        user_type in arb_user_type(),
        required_role in proptest::option::of(arb_role()),
        required_type in proptest::option::of(arb_user_type()),
        route in arb_route(),
    ) {
        let status = ready(user(role, user_type));
        let requirements = GateRequirements {
            required_role,
            required_user_type: required_type,
        };

        prop_assert_eq!(
            decide(&status, requirements, &route),
            decide(&status, requirements, &route)
        );
    }
}
