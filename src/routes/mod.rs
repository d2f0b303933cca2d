pub mod health;
pub mod auth;
pub mod users;
pub mod animals;
pub mod adoptions;
pub mod volunteers;
pub mod donations;
pub mod contact;
pub mod dashboard;

use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(health::health_check)
            .configure(auth::auth_routes)
            .configure(users::user_routes)
            .configure(animals::animal_routes)
            .configure(adoptions::adoption_routes)
            .configure(volunteers::volunteer_routes)
            .configure(donations::donation_routes)
            .configure(contact::contact_routes)
            .configure(dashboard::dashboard_routes)
    );
}
