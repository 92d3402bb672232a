//! HTTP handlers and route configuration.

mod employees;
mod health;

use actix_web::web;

use crate::middleware::error::AppError;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(AppError::malformed_request))
        .app_data(web::QueryConfig::default().error_handler(AppError::malformed_request))
        .service(
            web::scope("/api")
                // Public routes
                .route("/health", web::get().to(health::health_check))
                // Employee routes
                .service(
                    web::scope("/v1/employees")
                        .route("", web::post().to(employees::create_employee))
                        .route("", web::get().to(employees::list_employees))
                        .route("/{id}", web::get().to(employees::get_employee))
                        .route("/{id}", web::patch().to(employees::update_employee))
                        .route("/{id}", web::delete().to(employees::delete_employee)),
                ),
        );
}
