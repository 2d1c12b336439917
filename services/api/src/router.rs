use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post, put},
};
use tower_http::trace::TraceLayer;

use marquee_core::cors::cors_layer;
use marquee_core::health::{healthz, readyz};
use marquee_core::middleware::{propagate_request_id_layer, request_id_layer, security_headers};
use marquee_core::rate_limit::{RateLimitPolicy, enforce_rate_limit};

use crate::handlers::{
    admin, auth, category, entry_pass, event, exhibition, health, payment, rating, settings,
    ticket, user,
};
use crate::state::AppState;

pub const API_PREFIX: &str = "/api/v1";

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .nest(API_PREFIX, api_routes(&state))
        .layer(from_fn_with_state(state.security_headers, security_headers))
        .layer(cors_layer(state.cors_allowed_origins.as_deref()))
        .layer(propagate_request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}

fn api_routes(state: &AppState) -> Router<AppState> {
    let limited = |policy: RateLimitPolicy| {
        from_fn_with_state(state.rate_limiter.policy(policy), enforce_rate_limit)
    };

    // Credential endpoints carry a stricter budget on top of the general one.
    let login = Router::new()
        .route("/auth/login", post(auth::login))
        .route_layer(limited(RateLimitPolicy::LOGIN));
    let registration = Router::new()
        .route("/auth/register", post(auth::register))
        .route_layer(limited(RateLimitPolicy::REGISTRATION));
    let sensitive = Router::new()
        .route("/auth/forgotpassword", post(auth::forgot_password))
        .route("/auth/resend-verification", post(auth::resend_verification))
        .route_layer(limited(RateLimitPolicy::SENSITIVE));

    Router::new()
        .route("/health", get(health::health))
        // Auth
        .route("/auth/me", get(auth::get_me))
        .route("/auth/updatedetails", put(auth::update_details))
        .route("/auth/updatepassword", put(auth::update_password))
        .route("/auth/resetpassword/{token}", put(auth::reset_password))
        .route("/auth/verify-email/{token}", get(auth::verify_email))
        .merge(login)
        .merge(registration)
        .merge(sensitive)
        // Users
        .route("/users/setup-admin", post(user::setup_admin))
        .route("/users/profile", get(user::get_profile))
        .route("/users", get(user::list_users).post(user::create_user))
        .route(
            "/users/{id}",
            get(user::get_user)
                .put(user::update_user)
                .delete(user::delete_user),
        )
        // Categories
        .route(
            "/categories",
            get(category::list_categories).post(category::create_category),
        )
        // Events
        .route("/events", get(event::list_events).post(event::create_event))
        .route(
            "/events/{id}",
            get(event::get_event)
                .put(event::update_event)
                .delete(event::delete_event),
        )
        .route(
            "/events/{id}/shows",
            get(event::list_shows).post(event::create_show),
        )
        // Ratings
        .route(
            "/events/{id}/ratings",
            get(rating::list_event_ratings).post(rating::create_rating),
        )
        .route("/ratings/all", get(rating::list_all_ratings))
        .route(
            "/ratings/{id}",
            put(rating::update_rating).delete(rating::delete_rating),
        )
        // Exhibitions
        .route(
            "/exhibitions",
            get(exhibition::list_exhibitions).post(exhibition::create_exhibition),
        )
        .route(
            "/exhibitions/upcoming",
            get(exhibition::upcoming_exhibitions),
        )
        .route(
            "/exhibitions/{id}",
            get(exhibition::get_exhibition)
                .put(exhibition::update_exhibition)
                .delete(exhibition::delete_exhibition),
        )
        .route(
            "/exhibitions/{id}/events",
            get(exhibition::exhibition_events),
        )
        // Tickets
        .route("/tickets/book", post(ticket::book_ticket))
        .route("/tickets/me", get(ticket::my_tickets))
        .route("/tickets/my-tickets", get(ticket::my_tickets))
        .route("/tickets", get(ticket::list_tickets))
        .route("/tickets/verify", post(ticket::verify_ticket))
        .route("/tickets/verify-qr", post(ticket::verify_qr))
        .route("/tickets/mark-attended", post(ticket::mark_attended))
        .route("/tickets/{id}", get(ticket::get_ticket))
        .route("/tickets/{id}/status", put(ticket::set_ticket_status))
        .route("/tickets/{id}/cancel", put(ticket::cancel_ticket))
        // Payments
        .route("/payments/create-order", post(payment::create_order))
        .route("/payments/verify", post(payment::verify_payment))
        .route("/payments/me", get(payment::my_payments))
        .route("/payments", get(payment::list_payments))
        .route("/payments/history", get(payment::payment_history))
        .route("/payments/refund", post(payment::refund))
        // Entry passes
        .route("/entrypass/purchase", post(entry_pass::purchase))
        .route("/entrypass/me", get(entry_pass::my_entry_pass))
        // Admin
        .route("/admin/stats", get(admin::stats))
        .route("/admin/users", get(admin::list_users))
        .route("/admin/users/{id}", get(admin::get_user))
        .route("/admin/users/{id}/role", put(admin::set_user_role))
        .route("/admin/users/{id}/status", put(admin::set_user_status))
        .route("/admin/users/{id}/tickets", get(admin::user_tickets))
        .route("/admin/tickets", get(admin::list_tickets))
        .route("/admin/tickets/{id}", get(admin::get_ticket))
        .route(
            "/admin/events",
            get(admin::list_events).post(admin::create_event),
        )
        .route(
            "/admin/events/{id}",
            get(admin::get_event)
                .put(admin::update_event)
                .delete(admin::delete_event),
        )
        .route("/admin/events/{id}/status", put(admin::set_event_status))
        .route("/admin/events/{id}/tickets", get(admin::event_tickets))
        .route(
            "/admin/settings",
            get(settings::get_settings).put(settings::update_settings),
        )
        .layer(limited(RateLimitPolicy::GENERAL))
}
