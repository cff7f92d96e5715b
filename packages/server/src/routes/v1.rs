use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/auth", auth_routes())
        .nest("/tickets", ticket_routes())
        .nest("/notifications", notification_routes())
        .nest("/legacy", legacy_routes())
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::auth::register))
        .routes(routes!(handlers::auth::login))
        .routes(routes!(handlers::auth::me))
}

fn ticket_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::ticket::list_tickets,
            handlers::ticket::create_ticket
        ))
        // Static segments before "/{id}" so they are not swallowed by it.
        .routes(routes!(handlers::ticket::ticket_stats))
        .routes(routes!(handlers::ticket::ticket_summary))
        .routes(routes!(
            handlers::ticket::get_ticket,
            handlers::ticket::update_ticket
        ))
        .routes(routes!(handlers::ticket::convert_ticket))
        .nest("/{id}/activities", activity_routes())
}

fn activity_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::activity::list_activities,
            handlers::activity::create_activity
        ))
        .routes(routes!(
            handlers::activity::update_activity,
            handlers::activity::delete_activity
        ))
}

fn notification_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::notification::list_notifications))
        .routes(routes!(handlers::notification::unread_count))
        .routes(routes!(handlers::notification::mark_all_read))
        .routes(routes!(handlers::notification::clear_all))
        .routes(routes!(handlers::notification::announce))
        .routes(routes!(
            handlers::notification::get_notification,
            handlers::notification::delete_notification
        ))
        .routes(routes!(handlers::notification::mark_read))
        .routes(routes!(handlers::notification::archive_notification))
}

fn legacy_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::legacy::list_inquiries,
            handlers::legacy::create_inquiry
        ))
        .routes(routes!(handlers::legacy::get_inquiry))
        .routes(routes!(
            handlers::legacy::list_rmas,
            handlers::legacy::create_rma
        ))
        .routes(routes!(handlers::legacy::get_rma))
        .routes(routes!(
            handlers::legacy::list_dealer_repairs,
            handlers::legacy::create_dealer_repair
        ))
        .routes(routes!(handlers::legacy::get_dealer_repair))
}
