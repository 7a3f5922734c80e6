//! HTTP route handlers for the site.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page with public vendor search (?q=&page=)
//! POST /search-requests        - "Couldn't find it" request form
//! GET  /contact                - Contact page
//! POST /contact                - Contact form
//!
//! # Visitor accounts
//! GET  /account                - Sign-in / registration page
//! POST /account/login          - Sign in
//! POST /account/register       - Register
//! POST /account/logout         - Sign out
//!
//! # Admin
//! GET  /login                  - Admin login page
//! POST /login                  - Admin login form
//! POST /api/login              - Admin login (JSON)
//! POST /api/logout             - Admin logout, 303 to /login
//! GET  /dashboard              - Vendor listing + add form (?q=&page=)
//! POST /dashboard/vendors      - Add vendor
//! GET  /dashboard/vendors/:srno/edit    - Edit page
//! POST /dashboard/vendors/:srno         - Save edit
//! GET  /dashboard/vendors/:srno/delete  - Delete confirmation
//! POST /dashboard/vendors/:srno/delete  - Delete
//!
//! # JSON API
//! GET  /api/search                          - Public search (visibility applied)
//! POST /api/search-requests                 - Record a search request
//! POST /api/contact                         - Record a contact message
//! POST /api/auth/login                      - Visitor sign-in
//! POST /api/auth/register                   - Visitor registration
//! POST /api/auth/logout                     - Visitor sign-out
//! GET  /api/auth/me                         - Current visitor
//! GET  /api/admin/vendors                   - Admin listing (?q=&page=)
//! POST /api/admin/vendors                   - Insert under the next number
//! GET  /api/admin/vendors/next-srno         - Next sequence number
//! GET  /api/admin/vendors/:srno             - One vendor
//! PUT  /api/admin/vendors/:srno             - Update, returns the re-read row
//! DELETE /api/admin/vendors/:srno?confirm=true - Delete
//! ```

pub mod account;
pub mod admin_auth;
pub mod dashboard;
pub mod home;
pub mod leads;
pub mod paging;
pub mod vendors;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Create the visitor account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::account_page))
        .route("/login", post(account::login))
        .route("/register", post(account::register))
        .route("/logout", post(account::logout))
}

/// Create the admin login routes. The login handlers are rate limited per
/// client IP.
pub fn admin_auth_routes() -> Router<AppState> {
    let login = Router::new()
        .route(
            "/login",
            get(admin_auth::login_page).post(admin_auth::login),
        )
        .route("/api/login", post(admin_auth::api_login));

    let login = match auth_rate_limiter() {
        Some(limiter) => login.layer(limiter),
        None => login,
    };

    login.route("/api/logout", post(admin_auth::logout))
}

/// Create the dashboard routes router.
pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::index))
        .route("/vendors", post(dashboard::create))
        .route("/vendors/{srno}", post(dashboard::update))
        .route("/vendors/{srno}/edit", get(dashboard::edit))
        .route(
            "/vendors/{srno}/delete",
            get(dashboard::confirm_delete).post(dashboard::destroy),
        )
}

/// Create the admin vendor API router.
pub fn vendor_api_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(vendors::index).post(vendors::create))
        .route("/next-srno", get(vendors::next_srno))
        .route(
            "/{srno}",
            get(vendors::show)
                .put(vendors::update)
                .delete(vendors::destroy),
        )
}

/// Create the visitor auth API router.
pub fn account_api_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(account::api_login))
        .route("/register", post(account::api_register))
        .route("/logout", post(account::api_logout))
        .route("/me", get(account::api_me))
}

/// Create all routes for the site.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page and public search
        .route("/", get(home::home))
        .route("/search-requests", post(home::submit_search_request))
        .route(
            "/contact",
            get(leads::contact_page).post(leads::contact_submit),
        )
        // Visitor accounts
        .nest("/account", account_routes())
        // Admin
        .merge(admin_auth_routes())
        .nest("/dashboard", dashboard_routes())
        // JSON API
        .route("/api/search", get(home::api_search))
        .route("/api/search-requests", post(leads::api_search_request))
        .route("/api/contact", post(leads::api_contact))
        .nest("/api/auth", account_api_routes())
        .nest("/api/admin/vendors", vendor_api_routes())
}
