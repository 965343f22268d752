pub mod category_service;
pub mod concept_service;
pub mod oauth_service;
pub mod payment_service;
pub mod session_service;
pub mod state_service;

pub use category_service::{CategoryError, CategoryService, CategoryServiceImpl};
pub use concept_service::{ConceptError, ConceptService, ConceptServiceImpl};
pub use oauth_service::{GoogleIdentityProvider, IdentityProvider, OAuthService, OAuthServiceImpl};
pub use payment_service::{PaymentError, PaymentService, PaymentServiceImpl};
pub use session_service::{JwtSessionService, SESSION_TTL_DAYS, SessionService, SessionToken};
pub use state_service::{StateError, StateService, StateServiceImpl};
