//! Navigation menu pruning.

use serde::{Deserialize, Serialize};

use crate::permissions::Permission as P;
use crate::{Permission, PermissionSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NavigationNode {
    pub label: String,
    pub path: String,
    #[serde(default)]
    pub required_permissions: Vec<Permission>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NavigationNode>,
}

impl NavigationNode {
    pub fn new(
        label: impl Into<String>,
        path: impl Into<String>,
        required_permissions: &[Permission],
    ) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
            required_permissions: required_permissions.to_vec(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_children(mut self, children: Vec<NavigationNode>) -> Self {
        self.children = children;
        self
    }

    /// Visible to a holder of `permissions`: no requirements, or any one of them held.
    pub fn is_visible_to(&self, permissions: PermissionSet) -> bool {
        self.required_permissions.is_empty() || permissions.contains_any(&self.required_permissions)
    }
}

pub struct NavigationFilter;

impl NavigationFilter {
    /// Copy of `tree` holding only the nodes visible to `permissions`.
    ///
    /// A hidden node takes its whole subtree with it; children of a visible
    /// node are filtered on their own. Sibling order is kept.
    pub fn filter(tree: &[NavigationNode], permissions: PermissionSet) -> Vec<NavigationNode> {
        tree.iter()
            .filter(|node| node.is_visible_to(permissions))
            .map(|node| NavigationNode {
                label: node.label.clone(),
                path: node.path.clone(),
                required_permissions: node.required_permissions.clone(),
                children: Self::filter(&node.children, permissions),
            })
            .collect()
    }

    /// Paths of every node in `tree`, depth first.
    pub fn flatten_paths(tree: &[NavigationNode]) -> Vec<&str> {
        let mut paths = Vec::new();
        collect_paths(tree, &mut paths);
        paths
    }

    /// Main menu of the rental marketplace client.
    pub fn builtin() -> Vec<NavigationNode> {
        vec![
            NavigationNode::new("Dashboard", "/dashboard", &[]),
            NavigationNode::new("Properties", "/properties", &[P::PropertiesView]).with_children(vec![
                NavigationNode::new("Add property", "/properties/new", &[P::PropertiesCreate]),
                NavigationNode::new("Tenants", "/tenants", &[P::TenantsView]),
                NavigationNode::new("Leases", "/leases", &[P::LeasesView]),
            ]),
            NavigationNode::new("My lease", "/leases", &[P::LeasesView]),
            NavigationNode::new("Finances", "/finances", &[P::FinancesView]).with_children(vec![
                NavigationNode::new("Approvals", "/finances/approvals", &[P::FinancesApprove]),
                NavigationNode::new("Payments", "/payments", &[P::PaymentsView]),
                NavigationNode::new("Reports", "/reports", &[P::ReportsView]),
            ]),
            NavigationNode::new("Payments", "/payments", &[P::PaymentsProcess]),
            NavigationNode::new("Maintenance", "/issues", &[P::IssuesView]).with_children(vec![
                NavigationNode::new("Report an issue", "/issues/new", &[P::IssuesCreate]),
                NavigationNode::new("Work orders", "/work-orders", &[P::WorkOrdersView]),
                NavigationNode::new("Bids", "/bids", &[P::BidsView]),
            ]),
            NavigationNode::new("Documents", "/documents", &[P::DocumentsView]),
            NavigationNode::new("Board", "/board", &[P::BoardView]),
            NavigationNode::new("Emergency", "/emergency", &[P::EmergencyRespond, P::EmergencyDeclare]),
            NavigationNode::new("Administration", "/users", &[P::UsersView, P::SettingsManage])
                .with_children(vec![
                    NavigationNode::new("Users", "/users", &[P::UsersView]),
                    NavigationNode::new("Settings", "/settings", &[P::SettingsManage]),
                    NavigationNode::new("Audit log", "/audit", &[P::AuditView]),
                ]),
        ]
    }
}

fn collect_paths<'a>(tree: &'a [NavigationNode], out: &mut Vec<&'a str>) {
    for node in tree {
        out.push(node.path.as_str());
        collect_paths(&node.children, out);
    }
}
