pub mod category;
pub mod concept;
pub mod oauth;
pub mod payment;
pub mod session;
pub mod state;

pub use category::{
    Category, CategoryResponse, CreateCategoryRequest, DEFAULT_CATEGORY_COLOR,
    GENERAL_CATEGORY_ID, RenameCategoryRequest,
};
pub use concept::{
    Concept, ConceptChanges, ConceptResponse, CreateConceptRequest, NewConcept,
    UpdateConceptRequest,
};
pub use oauth::{AuthorizationRequest, CallbackQuery, IdTokenClaims, TokenResponse};
pub use payment::{
    CreatePaymentRequest, Payment, PaymentChanges, PaymentResponse, UpdatePaymentRequest,
};
pub use session::{MeResponse, SessionUser};
pub use state::{OkResponse, StateSnapshot};
