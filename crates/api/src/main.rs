use std::sync::Arc;

use aperture_api::directory::{InMemoryStaffDirectory, StaffRecord};
use aperture_api::jwt::Hs256Verifier;
use aperture_auth::{Role, RoleEquivalences, StaffId};

#[tokio::main]
async fn main() {
    aperture_observability::init();

    let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
        tracing::warn!("JWT_SECRET not set; using insecure dev default");
        "dev-secret".to_string()
    });

    let verifier = Arc::new(Hs256Verifier::new(jwt_secret.as_bytes()));
    let directory = Arc::new(InMemoryStaffDirectory::new());
    seed_dev_accounts(&directory).await;

    let app = aperture_api::app::build_app(verifier, directory, RoleEquivalences::builtin());

    let listener = tokio::net::TcpListener::bind("0.0.0.0:8080")
        .await
        .expect("failed to bind 0.0.0.0:8080");

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}

/// Seed a few accounts so the API is usable out of the box. Note the mix of
/// canonical and legacy role spellings; both must pass the same gates.
async fn seed_dev_accounts(directory: &InMemoryStaffDirectory) {
    for (name, email, role) in [
        ("Noor", "noor@aperture.example", "chairman"),
        ("Imran", "imran@aperture.example", "company_admin"),
        ("Sana", "sana@aperture.example", "branch_head"),
        ("Bilal", "bilal@aperture.example", "client"),
    ] {
        let record = StaffRecord {
            id: StaffId::new(),
            name: name.to_string(),
            email: email.to_string(),
            role: Role::new(role),
        };
        tracing::info!(staff_id = %record.id, role = %record.role, "seeded dev account");
        directory.insert(record).await;
    }
}
