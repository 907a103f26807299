//! End-to-end authorization scenarios through the public API.

use std::time::Duration;

use rentwise_auth::{
    AuthorizationContext, AuthzConfig, AuthzError, NavigationFilter, NavigationNode, Permission,
    PermissionCatalog, Principal, ResourceGrants, ResourceScopeGuard, Role, RoleHierarchy, RoleSet,
    RouteDecision, RoutePermissionRule, RouteTable, StaticGrantSource,
};
use rentwise_core::{PrincipalId, PropertyId};

fn roles(list: &[Role]) -> RoleSet {
    list.iter().copied().collect()
}

fn sign_in(list: &[Role], grants: ResourceGrants) -> AuthorizationContext {
    rentwise_observability::init();
    let principal = Principal::new(PrincipalId::new(), roles(list), grants).unwrap();
    AuthorizationContext::sign_in(principal)
}

fn property(id: &str) -> PropertyId {
    PropertyId::new(id).unwrap()
}

#[test]
fn tenant_and_accountant_elevate_to_accountant() {
    assert_eq!(
        RoleHierarchy::highest_of(roles(&[Role::Tenant, Role::Accountant])),
        Some(Role::Accountant)
    );
    assert!(sign_in(&[Role::Tenant, Role::Accountant], ResourceGrants::new()).is_role(Role::Accountant));
}

#[test]
fn owner_sees_only_granted_properties() {
    let ctx = sign_in(&[Role::Owner], ResourceGrants::new().with_property(property("p1")));

    assert!(ctx.is_role(Role::Owner));
    assert!(ctx.has_access_to_property(&property("p1")));
    assert!(!ctx.has_access_to_property(&property("p2")));
}

#[test]
fn property_manager_sees_never_seen_properties() {
    let ctx = sign_in(&[Role::PropertyManager], ResourceGrants::new());
    assert!(ctx.has_access_to_property(&property("brand-new-listing")));
}

#[test]
fn users_route_denied_without_either_permission() {
    let table = RouteTable::new(vec![RoutePermissionRule::new(
        "/users",
        &[Permission::UsersView, Permission::UsersManage],
    )]);
    let ctx = sign_in(&[Role::Tenant], ResourceGrants::new());

    assert_eq!(ctx.resolve_route(&table, "/users"), RouteDecision::deny("/dashboard"));
}

#[test]
fn dashboard_route_with_no_requirements_is_allowed() {
    let table = RouteTable::new(vec![RoutePermissionRule::public("/dashboard")]);
    let ctx = sign_in(&[Role::Vendor], ResourceGrants::new());

    let decision = ctx.resolve_route(&table, "/dashboard");
    assert!(decision.allowed);
    assert_eq!(decision.redirect, None);
}

#[test]
fn finances_subtree_is_pruned_without_finances_view() {
    let tree = vec![
        NavigationNode::new("Dashboard", "/dashboard", &[]),
        NavigationNode::new("Finances", "/finances", &[Permission::FinancesView]).with_children(vec![
            NavigationNode::new("Approvals", "/finances/approvals", &[Permission::FinancesApprove]),
            NavigationNode::new("Overview", "/finances/overview", &[]),
        ]),
        NavigationNode::new("Issues", "/issues", &[Permission::IssuesView]),
    ];
    let ctx = sign_in(&[Role::Tenant], ResourceGrants::new());
    assert!(!ctx.can(Permission::FinancesView));

    let filtered = ctx.filter_navigation(&tree);
    assert_eq!(
        NavigationFilter::flatten_paths(&filtered),
        vec!["/dashboard", "/issues"]
    );
}

#[test]
fn switching_to_unassigned_board_member_is_denied() {
    let ctx = sign_in(&[Role::Tenant], ResourceGrants::new());

    let result = ctx.switch_role(Role::BoardMember);
    assert_eq!(result, Err(AuthzError::PermissionDenied { requested: Role::BoardMember }));
    assert!(ctx.is_role(Role::Tenant));
}

#[test]
fn switching_to_the_active_role_changes_nothing() {
    let ctx = sign_in(&[Role::Owner, Role::Vendor], ResourceGrants::new());
    let same = ctx.switch_role(ctx.active_role()).unwrap();
    assert_eq!(same, ctx);
}

#[test]
fn role_switch_changes_guarded_routes() {
    let table = RouteTable::builtin();
    let board = sign_in(&[Role::Owner, Role::BoardMember], ResourceGrants::new());
    let owner = board.switch_role(Role::Owner).unwrap();

    assert!(board.resolve_route(&table, "/board/votes").allowed);
    assert_eq!(owner.resolve_route(&table, "/board/votes"), RouteDecision::deny("/board"));
}

#[test]
fn catalog_only_hands_out_closed_set_permissions() {
    for role in Role::ALL {
        for permission in PermissionCatalog::permissions_for(role).iter() {
            assert_eq!(permission.as_str().parse::<Permission>(), Ok(permission));
        }
    }
}

#[test]
fn configured_table_guards_routes() {
    let config = AuthzConfig::from_lookup(|_| None).unwrap();
    let table = config.load_route_table().unwrap();
    let accountant = sign_in(&[Role::Accountant], ResourceGrants::new());

    assert!(accountant.resolve_route(&table, "/finances/approvals").allowed);
    assert!(!accountant.resolve_route(&table, "/users").allowed);
}

#[tokio::test]
async fn external_grants_respect_the_configured_timeout() {
    let config = AuthzConfig::default();
    let ctx = sign_in(&[Role::Tenant], ResourceGrants::new());
    let mut source = StaticGrantSource::new();
    source.grant_property(ctx.principal().principal_id(), property("p7"));

    assert!(
        ResourceScopeGuard::check_property_remote(
            ctx.principal(),
            &property("p7"),
            &source,
            config.grant_lookup_timeout
        )
        .await
    );
    assert!(
        !ResourceScopeGuard::check_property_remote(
            ctx.principal(),
            &property("p8"),
            &source,
            Duration::from_millis(100)
        )
        .await
    );
}

#[test]
fn session_lifecycle_with_explanations() {
    let unit = rentwise_core::UnitId::new("u1").unwrap();
    let ctx = sign_in(
        &[Role::Tenant, Role::Vendor],
        ResourceGrants::new().with_unit(unit.clone()),
    );
    assert!(ctx.is_role(Role::Vendor));
    assert!(ctx.has_access_to_unit(&unit));

    let tenant = ctx.switch_role(Role::Tenant).unwrap();
    let explanation = tenant.explain(Permission::BidsSubmit);
    assert!(!explanation.granted);
    assert!(tenant.require(Permission::PaymentsProcess).is_ok());

    tenant.sign_out();
    ctx.sign_out();
}
