//! # Navigation
//!
//! Menu filtering and page gating on top of [`AccessGuard`].
//!
//! - [`visible_menu`] prunes a menu tree to what the session may see.
//! - [`PageGate`] decides whether a protected page renders, waits for the
//!   session, or redirects.

use crate::access::{AccessGuard, AccessRequirement, ResolvedRequirement};
use crate::primitives::DEFAULT_REDIRECT_PATH;
use crate::session::SessionState;
use crate::types::{Permission, Role};
use serde::{Deserialize, Serialize};

// =============================================================================
// MENU
// =============================================================================

/// One navigable entry, optionally with a submenu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub requirement: AccessRequirement,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MenuItem>,
}

impl MenuItem {
    /// An entry with no requirement.
    #[must_use]
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            requirement: AccessRequirement::open(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn permission(mut self, permission: Permission) -> Self {
        self.requirement.permission = Some(permission);
        self
    }

    #[must_use]
    pub fn roles(mut self, roles: impl IntoIterator<Item = Role>) -> Self {
        self.requirement.roles = Some(roles.into_iter().collect());
        self
    }

    #[must_use]
    pub fn children(mut self, children: Vec<MenuItem>) -> Self {
        self.children = children;
        self
    }

    /// Depth-first list of ids in this subtree, including this item.
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        let mut out = vec![self.id.as_str()];
        for child in &self.children {
            out.extend(child.ids());
        }
        out
    }
}

/// Keep only the items the session may see.
///
/// A hidden item hides its whole subtree. Children of a visible item are
/// filtered on their own requirements.
#[must_use]
pub fn visible_menu(guard: &AccessGuard, state: &SessionState, items: &[MenuItem]) -> Vec<MenuItem> {
    items
        .iter()
        .filter(|item| guard.allows(&item.requirement, state))
        .map(|item| MenuItem {
            id: item.id.clone(),
            label: item.label.clone(),
            requirement: item.requirement.clone(),
            children: visible_menu(guard, state, &item.children),
        })
        .collect()
}

/// The console's navigation catalogue.
///
/// Leaf ids are the page ids the console navigates to. Group ids only
/// toggle a submenu; the finance group is `finance-section` because
/// `finance` is the overview page.
#[must_use]
pub fn console_menu() -> Vec<MenuItem> {
    use Permission as P;
    use Role::{Admin, Manager, Staff, SuperAdmin};

    vec![
        MenuItem::new("dashboard", "Dashboard").permission(P::DashboardView),
        MenuItem::new("branches", "Branches").permission(P::BranchesView),
        MenuItem::new("centers-section", "Centers (CSU)")
            .permission(P::CentersView)
            .children(vec![
                MenuItem::new("centers", "Schedule"),
                MenuItem::new("meeting-scheduling", "Meeting Schedule")
                    .roles([SuperAdmin, Admin, Manager, Staff]),
                MenuItem::new("center-requests", "Transfer Requests")
                    .roles([SuperAdmin, Admin, Manager]),
            ]),
        MenuItem::new("groups", "Groups").permission(P::GroupsView),
        MenuItem::new("customers-section", "Customers")
            .permission(P::CustomersView)
            .children(vec![
                MenuItem::new("customers", "Customer List"),
                MenuItem::new("customer-requests", "Edit Approvals")
                    .roles([SuperAdmin, Admin, Manager]),
            ]),
        MenuItem::new("shareholders", "Shareholders"),
        MenuItem::new("products", "Product").children(vec![
            MenuItem::new("loan-product", "Loan"),
            MenuItem::new("investment-product", "Investment"),
        ]),
        MenuItem::new("loans", "Loans").children(vec![
            MenuItem::new("loan-create", "Create Loan").permission(P::LoansCreate),
            MenuItem::new("loan-approval", "Loan Approval").permission(P::LoansApprove),
            MenuItem::new("loan-sent-back", "Sent Back Loans").permission(P::LoansView),
            MenuItem::new("loan-list", "Loan List").permission(P::LoansView),
        ]),
        MenuItem::new("collections-section", "Collections").children(vec![
            MenuItem::new("due-list", "Due List").permission(P::CollectionsView),
            MenuItem::new("collections", "Collections").permission(P::CollectionsView),
            MenuItem::new("receipt-rejections", "Cancellation Requests")
                .permission(P::ReceiptsApproveCancel),
            MenuItem::new("collection-summary", "Collection Summary")
                .permission(P::CollectionsView),
        ]),
        MenuItem::new("investments-section", "Investments").children(vec![
            MenuItem::new("investment-create", "Create Investment"),
            MenuItem::new("investment-list", "Investment List"),
        ]),
        MenuItem::new("reports", "Reports"),
        MenuItem::new("approvals-section", "Transaction Approval").children(vec![
            MenuItem::new("salary-approval", "Salary Approval"),
            MenuItem::new("loan-payment-approval", "Loan Payment Approval"),
        ]),
        MenuItem::new("finance-section", "Finance").children(vec![
            MenuItem::new("finance", "Finance Overview").permission(P::FinanceView),
            MenuItem::new("fund-transactions", "Fund Truncation")
                .permission(P::FinanceTransactions),
            MenuItem::new("branch-transactions", "Branch Truncation")
                .permission(P::FinanceView),
        ]),
        MenuItem::new("promotion-section", "Promotion").children(vec![
            MenuItem::new("staff-promotion", "Staff Promotion"),
            MenuItem::new("promotion-approval", "Promotion Approval")
                .roles([SuperAdmin, Admin, Manager]),
        ]),
        MenuItem::new("staff-directory", "Staff Directory"),
        MenuItem::new("staff-management", "Staff Management").permission(P::StaffView),
        MenuItem::new("roles-privileges", "Roles").permission(P::RolesView),
        MenuItem::new("complaints", "Complaints"),
        MenuItem::new("system-config", "System Config").permission(P::SettingsView),
        MenuItem::new("documents", "Documents & Downloads"),
        MenuItem::new("public-website", "Public Website"),
    ]
}

// =============================================================================
// PAGE GATE
// =============================================================================

/// What a protected page should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageAccess {
    /// Session not loaded yet: render a loading placeholder.
    Pending,
    /// Render the page.
    Granted,
    /// Navigate away to the given path.
    Redirect(String),
}

impl PageAccess {
    /// Wire label: `pending`, `granted` or `redirect`.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            PageAccess::Pending => "pending",
            PageAccess::Granted => "granted",
            PageAccess::Redirect(_) => "redirect",
        }
    }
}

/// Gate for whole pages, as opposed to individual menu entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageGate {
    guard: AccessGuard,
    redirect_path: String,
}

impl Default for PageGate {
    fn default() -> Self {
        Self::new(AccessGuard::default())
    }
}

impl PageGate {
    #[must_use]
    pub fn new(guard: AccessGuard) -> Self {
        Self {
            guard,
            redirect_path: DEFAULT_REDIRECT_PATH.to_string(),
        }
    }

    #[must_use]
    pub fn with_redirect(mut self, path: impl Into<String>) -> Self {
        self.redirect_path = path.into();
        self
    }

    #[must_use]
    pub fn redirect_path(&self) -> &str {
        &self.redirect_path
    }

    /// Decide the page outcome.
    ///
    /// Open pages render even before the session loads. Gated pages wait
    /// while the session is uninitialized, then render or redirect.
    #[must_use]
    pub fn evaluate(&self, requirement: &AccessRequirement, state: &SessionState) -> PageAccess {
        if self.guard.allows(requirement, state) {
            return PageAccess::Granted;
        }
        self.denied(state)
    }

    /// Same as [`PageGate::evaluate`] for a resolved raw requirement.
    /// Unsatisfiable requirements never grant.
    #[must_use]
    pub fn evaluate_resolved(
        &self,
        resolved: &ResolvedRequirement,
        state: &SessionState,
    ) -> PageAccess {
        match &resolved.requirement {
            Some(requirement) => self.evaluate(requirement, state),
            None => self.denied(state),
        }
    }

    fn denied(&self, state: &SessionState) -> PageAccess {
        match state {
            SessionState::Uninitialized => PageAccess::Pending,
            SessionState::Ready(_) => PageAccess::Redirect(self.redirect_path.clone()),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;

    fn visible_ids(items: &[MenuItem]) -> Vec<String> {
        items
            .iter()
            .flat_map(|item| item.ids())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn catalogue_uses_console_page_ids() {
        let ids = visible_ids(&console_menu());
        let expected = [
            "dashboard",
            "branches",
            "centers-section",
            "centers",
            "meeting-scheduling",
            "center-requests",
            "groups",
            "customers-section",
            "customers",
            "customer-requests",
            "shareholders",
            "products",
            "loan-product",
            "investment-product",
            "loans",
            "loan-create",
            "loan-approval",
            "loan-sent-back",
            "loan-list",
            "collections-section",
            "due-list",
            "collections",
            "receipt-rejections",
            "collection-summary",
            "investments-section",
            "investment-create",
            "investment-list",
            "reports",
            "approvals-section",
            "salary-approval",
            "loan-payment-approval",
            "finance-section",
            "finance",
            "fund-transactions",
            "branch-transactions",
            "promotion-section",
            "staff-promotion",
            "promotion-approval",
            "staff-directory",
            "staff-management",
            "roles-privileges",
            "complaints",
            "system-config",
            "documents",
            "public-website",
        ];
        assert_eq!(ids, expected);
    }

    #[test]
    fn catalogue_ids_are_unique() {
        let ids = visible_ids(&console_menu());
        let unique: std::collections::BTreeSet<&String> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn permission_gated_pages() {
        let state: SessionState = Session::new(
            Some(Role::Staff),
            [Permission::StaffView, Permission::SettingsView],
        )
        .into();
        let ids = visible_ids(&visible_menu(&AccessGuard::new(), &state, &console_menu()));
        assert!(ids.contains(&"staff-management".to_string()));
        assert!(ids.contains(&"system-config".to_string()));
        assert!(!ids.contains(&"roles-privileges".to_string()));
        assert!(ids.contains(&"staff-directory".to_string()));
        assert!(!ids.contains(&"finance".to_string()));
    }

    #[test]
    fn page_access_labels() {
        assert_eq!(PageAccess::Pending.label(), "pending");
        assert_eq!(PageAccess::Granted.label(), "granted");
        assert_eq!(PageAccess::Redirect("/".to_string()).label(), "redirect");
    }

    #[test]
    fn uninitialized_shows_only_open_items() {
        let menu = visible_menu(&AccessGuard::new(), &SessionState::Uninitialized, &console_menu());
        let ids = visible_ids(&menu);
        assert!(ids.contains(&"shareholders".to_string()));
        assert!(ids.contains(&"salary-approval".to_string()));
        assert!(!ids.contains(&"dashboard".to_string()));
        assert!(!ids.contains(&"loan-create".to_string()));
        assert!(!ids.contains(&"promotion-approval".to_string()));
    }

    #[test]
    fn hidden_parent_hides_children() {
        let state: SessionState = Session::new(Some(Role::Manager), []).into();
        let menu = visible_menu(&AccessGuard::new(), &state, &console_menu());
        let ids = visible_ids(&menu);
        assert!(!ids.contains(&"centers-section".to_string()));
        assert!(!ids.contains(&"center-requests".to_string()));
    }

    #[test]
    fn children_filtered_by_role() {
        let state: SessionState = Session::new(Some(Role::Staff), [Permission::CentersView]).into();
        let menu = visible_menu(&AccessGuard::new(), &state, &console_menu());
        let centers = menu
            .iter()
            .find(|item| item.id == "centers-section")
            .expect("centers visible");
        let child_ids: Vec<&str> = centers.children.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(child_ids, vec!["centers", "meeting-scheduling"]);
    }

    #[test]
    fn super_admin_sees_every_permission_item() {
        let state: SessionState = Session::new(Some(Role::SuperAdmin), []).into();
        let full = visible_ids(&console_menu());
        let menu = visible_menu(&AccessGuard::new(), &state, &console_menu());
        assert_eq!(visible_ids(&menu), full);
    }

    #[test]
    fn page_gate_outcomes() {
        let gate = PageGate::default();
        let req = AccessRequirement::permission(Permission::CentersView);

        assert_eq!(gate.evaluate(&req, &SessionState::Uninitialized), PageAccess::Pending);

        let allowed: SessionState = Session::new(Some(Role::Staff), [Permission::CentersView]).into();
        assert_eq!(gate.evaluate(&req, &allowed), PageAccess::Granted);

        let denied: SessionState = Session::new(Some(Role::Staff), []).into();
        assert_eq!(gate.evaluate(&req, &denied), PageAccess::Redirect("/".to_string()));

        let admin: SessionState = Session::new(Some(Role::SuperAdmin), []).into();
        assert_eq!(gate.evaluate(&req, &admin), PageAccess::Granted);
    }

    #[test]
    fn page_gate_custom_redirect() {
        let gate = PageGate::default().with_redirect("/login");
        let req = AccessRequirement::roles([Role::Admin]);
        let state: SessionState = Session::new(Some(Role::Staff), []).into();
        assert_eq!(gate.evaluate(&req, &state), PageAccess::Redirect("/login".to_string()));
        assert_eq!(gate.redirect_path(), "/login");
    }

    #[test]
    fn unsatisfiable_page_never_granted() {
        use crate::access::RawRequirement;

        let gate = PageGate::default();
        let resolved = RawRequirement {
            permission: Some("reports.view".to_string()),
            roles: None,
        }
        .resolve();
        let admin: SessionState = Session::new(Some(Role::SuperAdmin), []).into();
        assert_eq!(gate.evaluate_resolved(&resolved, &SessionState::Uninitialized), PageAccess::Pending);
        assert_eq!(gate.evaluate_resolved(&resolved, &admin), PageAccess::Redirect("/".to_string()));
    }

    #[test]
    fn open_page_granted_before_session() {
        let gate = PageGate::default();
        assert_eq!(
            gate.evaluate(&AccessRequirement::open(), &SessionState::Uninitialized),
            PageAccess::Granted
        );
    }
}
