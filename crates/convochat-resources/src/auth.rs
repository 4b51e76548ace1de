use convochat_core::{payload, ApiClient, Envelope, Payload, Result};

pub const RESOURCE: &str = "Auth";

pub mod endpoints {
    use convochat_core::Endpoint;

    pub const LOGIN: Endpoint = Endpoint::post("/api/login")
        .requires(&["email", "password"])
        .redacting(&["password"]);
    pub const REGISTER: Endpoint = Endpoint::post("/api/register")
        .requires(&["name", "email", "password"])
        .redacting(&["password"]);
    pub const LOGOUT: Endpoint = Endpoint::post("/api/logout");
    pub const USER: Endpoint = Endpoint::post("/api/user");
}

/// Dashboard account session endpoints. Every call is a POST.
#[derive(Debug, Clone)]
pub struct AuthService {
    client: ApiClient,
}

impl AuthService {
    pub fn new(client: &ApiClient) -> Self {
        Self {
            client: client.for_resource(RESOURCE),
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Envelope> {
        self.client
            .call(
                &endpoints::LOGIN,
                payload! { "email" => email, "password" => password },
            )
            .await
    }

    pub async fn register(&self, fields: Payload) -> Result<Envelope> {
        self.client.call(&endpoints::REGISTER, fields).await
    }

    pub async fn logout(&self) -> Result<Envelope> {
        self.client.call(&endpoints::LOGOUT, Payload::new()).await
    }

    pub async fn get_user(&self) -> Result<Envelope> {
        self.client.call(&endpoints::USER, Payload::new()).await
    }
}
