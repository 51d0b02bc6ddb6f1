//! OpenAPI documentation.

use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};

use crate::handlers::auth_handler::{LoginRequest, SessionResponse, SignupRequest};
use crate::handlers::page_handler::{DashboardView, LoginPage};
use crate::handlers::profile_handler::UpdateRoleRequest;
use domain::{
    Customer, CustomerBalance, Expense, NewCustomer, NewExpense, NewPayment, NewProduction,
    NewSale, Payment, Production, Sale, UserProfile, UserRole,
};

/// API documentation struct.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::auth_handler::login,
        crate::handlers::auth_handler::signup,
        crate::handlers::auth_handler::logout,
        crate::handlers::auth_handler::authorize,
        crate::handlers::auth_handler::callback,
        crate::handlers::page_handler::login_page,
        crate::handlers::page_handler::dashboard,
        crate::handlers::profile_handler::get_profile,
        crate::handlers::profile_handler::update_role,
        crate::handlers::record_handler::list_customers,
        crate::handlers::record_handler::customer_balances,
        crate::handlers::record_handler::list_productions,
        crate::handlers::record_handler::recent_productions,
        crate::handlers::record_handler::list_sales,
        crate::handlers::record_handler::list_payments,
        crate::handlers::record_handler::list_expenses,
        crate::handlers::mutation_handler::create_customer,
        crate::handlers::mutation_handler::create_production,
        crate::handlers::mutation_handler::create_sale,
        crate::handlers::mutation_handler::create_payment,
        crate::handlers::mutation_handler::create_expense,
        crate::handlers::mutation_handler::delete_customer,
        crate::handlers::mutation_handler::delete_production,
        crate::handlers::mutation_handler::delete_sale,
        crate::handlers::mutation_handler::delete_payment,
        crate::handlers::mutation_handler::delete_expense,
    ),
    components(
        schemas(
            LoginRequest,
            SignupRequest,
            SessionResponse,
            LoginPage,
            DashboardView,
            UpdateRoleRequest,
            UserProfile,
            UserRole,
            Customer,
            Production,
            Sale,
            Payment,
            Expense,
            CustomerBalance,
            NewCustomer,
            NewProduction,
            NewSale,
            NewPayment,
            NewExpense,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Session endpoints"),
        (name = "Pages", description = "Login and dashboard documents"),
        (name = "Users", description = "Profile and role management"),
        (name = "Customers", description = "Customer records and balances"),
        (name = "Productions", description = "Production batches"),
        (name = "Sales", description = "Sales"),
        (name = "Payments", description = "Customer payments"),
        (name = "Expenses", description = "Business expenses"),
    )
)]
pub struct ApiDoc;

/// Security scheme modifier.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("sb-access-token"))),
            );
        }
    }
}
