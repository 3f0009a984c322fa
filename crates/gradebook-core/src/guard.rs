//! Role-gated routing
//!
//! [`RouteGuard::evaluate`] is a pure function of the session state. The
//! route table maps application paths to views and their guards.

use crate::models::{Role, SessionState};
use crate::navigation::{Navigator, DEFAULT_LANDING_PATH, LOGIN_PATH};

/// Outcome of checking a guard against the current session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session resolution still pending
    Loading,
    Redirect(&'static str),
    Render,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RouteGuard {
    required_role: Option<Role>,
}

impl RouteGuard {
    /// Any authenticated session passes
    pub const fn authenticated() -> Self {
        Self { required_role: None }
    }

    pub const fn require(role: Role) -> Self {
        Self {
            required_role: Some(role),
        }
    }

    pub fn required_role(&self) -> Option<Role> {
        self.required_role
    }

    pub fn evaluate(&self, state: &SessionState) -> GuardDecision {
        match state {
            SessionState::Pending => GuardDecision::Loading,
            SessionState::Anonymous => GuardDecision::Redirect(LOGIN_PATH),
            SessionState::Active(session) => match self.required_role {
                None => GuardDecision::Render,
                Some(required) if role_permits(required, session.role()) => GuardDecision::Render,
                Some(_) => GuardDecision::Redirect(DEFAULT_LANDING_PATH),
            },
        }
    }

    /// Evaluate and follow any redirect through `navigator`
    pub fn enforce(&self, state: &SessionState, navigator: &dyn Navigator) -> GuardDecision {
        let decision = self.evaluate(state);
        if let GuardDecision::Redirect(path) = decision {
            navigator.navigate(path);
        }
        decision
    }
}

fn role_permits(required: Role, actual: Role) -> bool {
    match (required, actual) {
        (Role::Student, Role::Student) | (Role::Professor, Role::Professor) => true,
        (Role::Student, Role::Professor) | (Role::Professor, Role::Student) => false,
    }
}

// ============================================================================
// Route table
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Home,
    Login,
    Register,
    Dashboard,
    ExerciseCreate,
    ExerciseManage,
    ExerciseDetails,
    ExerciseEdit,
    SubmissionList,
    SubmissionDetails,
}

impl View {
    pub fn name(&self) -> &'static str {
        match self {
            View::Home => "home",
            View::Login => "login",
            View::Register => "register",
            View::Dashboard => "dashboard",
            View::ExerciseCreate => "exercise-create",
            View::ExerciseManage => "exercise-manage",
            View::ExerciseDetails => "exercise-details",
            View::ExerciseEdit => "exercise-edit",
            View::SubmissionList => "submission-list",
            View::SubmissionDetails => "submission-details",
        }
    }
}

/// Which dashboard `/dashboard` shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dashboard {
    Professor,
    Student,
}

pub fn dashboard_for(role: Role) -> Dashboard {
    match role {
        Role::Professor => Dashboard::Professor,
        Role::Student => Dashboard::Student,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Protected(RouteGuard),
}

#[derive(Debug, Clone, Copy)]
pub struct RouteDef {
    /// Segments starting with `:` match any single segment
    pub pattern: &'static str,
    pub view: View,
    pub access: Access,
}

const fn route(pattern: &'static str, view: View, access: Access) -> RouteDef {
    RouteDef {
        pattern,
        view,
        access,
    }
}

const ANY_SESSION: Access = Access::Protected(RouteGuard::authenticated());
const PROFESSOR: Access = Access::Protected(RouteGuard::require(Role::Professor));
const STUDENT: Access = Access::Protected(RouteGuard::require(Role::Student));

pub const ROUTES: &[RouteDef] = &[
    route("/", View::Home, Access::Public),
    route("/login", View::Login, Access::Public),
    route("/register", View::Register, Access::Public),
    route("/dashboard", View::Dashboard, ANY_SESSION),
    route("/exercises/create", View::ExerciseCreate, PROFESSOR),
    route("/exercises/manage", View::ExerciseManage, PROFESSOR),
    route("/exercises/:id", View::ExerciseDetails, ANY_SESSION),
    route("/exercises/:id/edit", View::ExerciseEdit, PROFESSOR),
    route("/submissions", View::SubmissionList, STUDENT),
    route("/submissions/:id", View::SubmissionDetails, ANY_SESSION),
];

#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub route: &'static RouteDef,
    pub params: Vec<(&'static str, String)>,
}

impl RouteMatch {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }
}

fn segments(path: &str) -> Vec<&str> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Find the route for `path`. Literal segments win over parameters.
pub fn match_route(path: &str) -> Option<RouteMatch> {
    let wanted = segments(path);
    let mut best: Option<(usize, RouteMatch)> = None;

    for def in ROUTES {
        let pattern = segments(def.pattern);
        if pattern.len() != wanted.len() {
            continue;
        }

        let mut literals = 0;
        let mut params = Vec::new();
        let mut matched = true;
        for (p, w) in pattern.into_iter().zip(wanted.iter().copied()) {
            if let Some(name) = p.strip_prefix(':') {
                params.push((name, w.to_string()));
            } else if p == w {
                literals += 1;
            } else {
                matched = false;
                break;
            }
        }

        if matched && best.as_ref().map_or(true, |(score, _)| literals > *score) {
            best = Some((literals, RouteMatch { route: def, params }));
        }
    }

    best.map(|(_, m)| m)
}

/// What visiting a path produces for the given session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Render(View),
    Loading,
    Redirect(&'static str),
    NotFound,
}

pub fn resolve(path: &str, state: &SessionState) -> Resolution {
    let Some(matched) = match_route(path) else {
        return Resolution::NotFound;
    };

    match matched.route.access {
        Access::Public => Resolution::Render(matched.route.view),
        Access::Protected(guard) => match guard.evaluate(state) {
            GuardDecision::Loading => Resolution::Loading,
            GuardDecision::Redirect(to) => Resolution::Redirect(to),
            GuardDecision::Render => Resolution::Render(matched.route.view),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Session;
    use crate::navigation::History;

    fn active(role: Role) -> SessionState {
        SessionState::Active(Session::new("1", role, "tok", None).unwrap())
    }

    #[test]
    fn test_pending_renders_loading() {
        let guard = RouteGuard::require(Role::Professor);
        assert_eq!(guard.evaluate(&SessionState::Pending), GuardDecision::Loading);
    }

    #[test]
    fn test_anonymous_redirects_to_login() {
        for guard in [
            RouteGuard::authenticated(),
            RouteGuard::require(Role::Student),
            RouteGuard::require(Role::Professor),
        ] {
            assert_eq!(
                guard.evaluate(&SessionState::Anonymous),
                GuardDecision::Redirect(LOGIN_PATH)
            );
        }
    }

    #[test]
    fn test_student_on_professor_route_goes_to_dashboard() {
        let guard = RouteGuard::require(Role::Professor);
        assert_eq!(
            guard.evaluate(&active(Role::Student)),
            GuardDecision::Redirect(DEFAULT_LANDING_PATH)
        );
        assert_eq!(guard.evaluate(&active(Role::Professor)), GuardDecision::Render);
    }

    #[test]
    fn test_no_required_role_renders_any_session() {
        let guard = RouteGuard::authenticated();
        assert_eq!(guard.evaluate(&active(Role::Student)), GuardDecision::Render);
        assert_eq!(guard.evaluate(&active(Role::Professor)), GuardDecision::Render);
    }

    #[test]
    fn test_enforce_navigates_on_redirect_only() {
        let history = History::new();
        let guard = RouteGuard::require(Role::Student);

        guard.enforce(&active(Role::Student), &history);
        assert!(history.entries().is_empty());

        guard.enforce(&SessionState::Anonymous, &history);
        assert_eq!(history.current().as_deref(), Some(LOGIN_PATH));
    }

    #[test]
    fn test_literal_segment_beats_parameter() {
        let m = match_route("/exercises/create").unwrap();
        assert_eq!(m.route.view, View::ExerciseCreate);

        let m = match_route("/exercises/42").unwrap();
        assert_eq!(m.route.view, View::ExerciseDetails);
        assert_eq!(m.param("id"), Some("42"));

        let m = match_route("/exercises/42/edit/").unwrap();
        assert_eq!(m.route.view, View::ExerciseEdit);
    }

    #[test]
    fn test_match_ignores_query_and_fragment() {
        let m = match_route("/submissions?page=2#top").unwrap();
        assert_eq!(m.route.view, View::SubmissionList);
        assert_eq!(match_route("/").unwrap().route.view, View::Home);
    }

    #[test]
    fn test_unknown_path_not_found() {
        assert_eq!(resolve("/nope", &SessionState::Anonymous), Resolution::NotFound);
        assert_eq!(
            resolve("/exercises/1/edit/extra", &active(Role::Professor)),
            Resolution::NotFound
        );
    }

    #[test]
    fn test_every_protected_route_redirects_anonymous() {
        for def in ROUTES {
            let path = def.pattern.replace(":id", "1");
            let expected = match def.access {
                Access::Public => Resolution::Render(def.view),
                Access::Protected(_) => Resolution::Redirect(LOGIN_PATH),
            };
            assert_eq!(resolve(&path, &SessionState::Anonymous), expected, "{}", path);
        }
    }

    #[test]
    fn test_resolve_role_routes() {
        assert_eq!(
            resolve("/submissions", &active(Role::Professor)),
            Resolution::Redirect(DEFAULT_LANDING_PATH)
        );
        assert_eq!(
            resolve("/submissions", &active(Role::Student)),
            Resolution::Render(View::SubmissionList)
        );
        assert_eq!(
            resolve("/exercises/manage", &SessionState::Pending),
            Resolution::Loading
        );
        assert_eq!(resolve("/login", &SessionState::Pending), Resolution::Render(View::Login));
    }

    #[test]
    fn test_dashboard_for_role() {
        assert_eq!(dashboard_for(Role::Professor), Dashboard::Professor);
        assert_eq!(dashboard_for(Role::Student), Dashboard::Student);
    }
}
