//! HTTP handlers for checkout endpoints.
//!
//! These handlers connect Axum routes to application layer command handlers.

use std::sync::Arc;

use axum::extract::{Json, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use secrecy::SecretString;

use crate::application::{
    ApplyCouponCommand, ApplyCouponHandler, AuthAction, CancelCheckoutCommand,
    CancelCheckoutHandler, ConfirmConsentCommand, ConfirmConsentHandler, CreateConsentCommand,
    CreateConsentHandler, CreateOrderCommand, CreateOrderHandler, EnsureAuthenticatedCommand,
    EnsureAuthenticatedHandler, HandleGatewayReturnCommand, HandleGatewayReturnHandler,
    HandleGatewayWebhookCommand, HandleGatewayWebhookHandler, LaunchCheckoutCommand,
    LaunchCheckoutHandler, SelectPlanCommand, SelectPlanHandler, VerifyActivationCommand,
    VerifyActivationHandler,
};
use crate::application::handlers::checkout::store_error;
use crate::domain::foundation::{BundleId, CheckoutId, DomainError, ErrorCode, UserId};
use crate::ports::{
    BundleCatalog, CouponRegistry, Credentials, EntitlementCache, EsignProvider, FlowStateStore,
    IdentityProvider, PaymentGateway, Registration,
};

use super::dto::{
    ApplyCouponRequest, AuthRequest, AuthResponse, BundleResponse, BundlesResponse,
    ConsentConfirmationResponse, ConsentResponse, CouponAppliedResponse, CreateConsentRequest,
    ErrorResponse, FlowResponse, IdentityResponse, LaunchResponse, OrderSessionResponse,
    PlaceOrderRequest, ReturnResponse, StartCheckoutRequest, VerificationResponse, WebhookQuery,
};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all dependencies.
///
/// This struct is cloned for each request and contains Arc-wrapped
/// dependencies for efficient sharing across handlers.
#[derive(Clone)]
pub struct CheckoutAppState {
    pub flow_store: Arc<dyn FlowStateStore>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub esign: Arc<dyn EsignProvider>,
    pub identity: Arc<dyn IdentityProvider>,
    pub coupons: Arc<dyn CouponRegistry>,
    pub catalog: Arc<dyn BundleCatalog>,
    pub entitlements: Arc<dyn EntitlementCache>,
}

impl CheckoutAppState {
    /// Create handlers on demand from the shared state.
    pub fn select_plan_handler(&self) -> SelectPlanHandler {
        SelectPlanHandler::new(self.catalog.clone(), self.flow_store.clone())
    }

    pub fn ensure_authenticated_handler(&self) -> EnsureAuthenticatedHandler {
        EnsureAuthenticatedHandler::new(
            self.flow_store.clone(),
            self.identity.clone(),
            self.entitlements.clone(),
        )
    }

    pub fn create_consent_handler(&self) -> CreateConsentHandler {
        CreateConsentHandler::new(self.flow_store.clone(), self.esign.clone())
    }

    pub fn confirm_consent_handler(&self) -> ConfirmConsentHandler {
        ConfirmConsentHandler::new(self.flow_store.clone(), self.esign.clone())
    }

    pub fn create_order_handler(&self) -> CreateOrderHandler {
        CreateOrderHandler::new(self.flow_store.clone(), self.gateway.clone())
    }

    pub fn launch_checkout_handler(&self) -> LaunchCheckoutHandler {
        LaunchCheckoutHandler::new(self.flow_store.clone())
    }

    pub fn gateway_return_handler(&self) -> HandleGatewayReturnHandler {
        HandleGatewayReturnHandler::new(self.flow_store.clone())
    }

    pub fn verify_activation_handler(&self) -> VerifyActivationHandler {
        VerifyActivationHandler::new(
            self.flow_store.clone(),
            self.gateway.clone(),
            self.entitlements.clone(),
        )
    }

    pub fn apply_coupon_handler(&self) -> ApplyCouponHandler {
        ApplyCouponHandler::new(self.flow_store.clone(), self.coupons.clone())
    }

    pub fn cancel_checkout_handler(&self) -> CancelCheckoutHandler {
        CancelCheckoutHandler::new(self.flow_store.clone())
    }

    pub fn webhook_handler(&self) -> HandleGatewayWebhookHandler {
        HandleGatewayWebhookHandler::new(
            self.flow_store.clone(),
            self.gateway.clone(),
            self.entitlements.clone(),
        )
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Authenticated User Extraction
// ════════════════════════════════════════════════════════════════════════════════

/// Authenticated user context extracted from the bearer token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
}

/// Rejection type for AuthenticatedUser extraction.
pub struct AuthenticationRequired;

impl IntoResponse for AuthenticationRequired {
    fn into_response(self) -> axum::response::Response {
        let error = ErrorResponse::new("AUTHENTICATION_REQUIRED", "Authentication is required");
        (StatusCode::UNAUTHORIZED, Json(error)).into_response()
    }
}

impl axum::extract::FromRequestParts<CheckoutAppState> for AuthenticatedUser {
    type Rejection = AuthenticationRequired;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut axum::http::request::Parts,
        state: &'life1 CheckoutAppState,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let token = parts
                .headers
                .get(axum::http::header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.strip_prefix("Bearer "))
                .ok_or(AuthenticationRequired)?;

            let user_id = state
                .identity
                .validate_token(token)
                .await
                .map_err(|_| AuthenticationRequired)?;

            Ok(AuthenticatedUser { user_id })
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Catalog Endpoints
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/bundles - List purchasable bundles with per-cycle pricing
pub async fn list_bundles(
    State(state): State<CheckoutAppState>,
) -> Result<impl IntoResponse, ApiError> {
    let bundles = state
        .catalog
        .list_bundles()
        .await
        .map_err(DomainError::from)?;

    let response = BundlesResponse {
        bundles: bundles.into_iter().map(BundleResponse::from).collect(),
    };
    Ok(Json(response))
}

// ════════════════════════════════════════════════════════════════════════════════
// Checkout Flow Endpoints
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/checkout - Start a checkout for a chosen bundle and cycle
pub async fn start_checkout(
    State(state): State<CheckoutAppState>,
    Json(request): Json<StartCheckoutRequest>,
) -> Result<impl IntoResponse + std::fmt::Debug, ApiError> {
    let handler = state.select_plan_handler();
    let cmd = SelectPlanCommand {
        bundle_id: BundleId::new(request.bundle_id).map_err(DomainError::from)?,
        cycle: request.cycle,
    };

    let result = handler.handle(cmd).await?;

    Ok((StatusCode::CREATED, Json(FlowResponse::from(result.flow))))
}

/// GET /api/checkout/:id - Get the current flow state
pub async fn get_checkout(
    State(state): State<CheckoutAppState>,
    Path(checkout_id): Path<CheckoutId>,
) -> Result<impl IntoResponse + std::fmt::Debug, ApiError> {
    let flow = state
        .flow_store
        .load(checkout_id)
        .await
        .map_err(store_error)?;

    Ok(Json(FlowResponse::from(flow)))
}

/// POST /api/checkout/:id/auth - Confirm an identity at the auth gate
pub async fn authenticate(
    State(state): State<CheckoutAppState>,
    Path(checkout_id): Path<CheckoutId>,
    user: Option<AuthenticatedUser>,
    Json(request): Json<AuthRequest>,
) -> Result<impl IntoResponse + std::fmt::Debug, ApiError> {
    let action = match request {
        AuthRequest::Login { email, password } => AuthAction::Login(Credentials {
            email,
            password: SecretString::new(password),
        }),
        AuthRequest::Register {
            email,
            name,
            phone,
            password,
        } => AuthAction::Register(Registration {
            email,
            name,
            phone,
            password: SecretString::new(password),
        }),
        AuthRequest::Resume {} => {
            let user = user.ok_or_else(|| {
                ApiError::from(DomainError::new(
                    ErrorCode::AuthenticationRequired,
                    "Resuming requires a valid bearer token",
                ))
            })?;
            AuthAction::Resume {
                user_id: user.user_id,
            }
        }
    };

    let handler = state.ensure_authenticated_handler();
    let result = handler
        .handle(EnsureAuthenticatedCommand {
            checkout_id,
            action,
        })
        .await?;

    let response = AuthResponse {
        flow: FlowResponse::from(result.flow),
        identity: result.identity.map(IdentityResponse::from),
    };
    Ok(Json(response))
}

/// POST /api/checkout/:id/consent - Create the e-mandate consent document
pub async fn create_consent(
    State(state): State<CheckoutAppState>,
    Path(checkout_id): Path<CheckoutId>,
    Json(request): Json<CreateConsentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let handler = state.create_consent_handler();
    let result = handler
        .handle(CreateConsentCommand {
            checkout_id,
            return_url: request.return_url,
        })
        .await?;

    let response = ConsentResponse {
        document_id: result.document.document_id.as_str().to_string(),
        signing_url: result.document.signing_url.clone(),
        status: result.document.status,
        flow: FlowResponse::from(result.flow),
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/checkout/:id/consent/confirm - Check signing status and advance
pub async fn confirm_consent(
    State(state): State<CheckoutAppState>,
    Path(checkout_id): Path<CheckoutId>,
) -> Result<impl IntoResponse, ApiError> {
    let handler = state.confirm_consent_handler();
    let result = handler.handle(ConfirmConsentCommand { checkout_id }).await?;

    let response = ConsentConfirmationResponse {
        consent_status: result.consent_status,
        flow: FlowResponse::from(result.flow),
    };
    Ok(Json(response))
}

/// POST /api/checkout/:id/order - Create the gateway order/subscription
pub async fn place_order(
    State(state): State<CheckoutAppState>,
    Path(checkout_id): Path<CheckoutId>,
    Json(request): Json<PlaceOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let handler = state.create_order_handler();
    let result = handler
        .handle(CreateOrderCommand {
            checkout_id,
            return_url: request.return_url,
        })
        .await?;

    let response = OrderSessionResponse {
        session_id: result.session.session_id.as_str().to_string(),
        reference: result.session.reference.clone(),
        checkout_url: result.session.checkout_url.clone(),
        flow: FlowResponse::from(result.flow),
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/checkout/:id/launch - Re-read the persisted handoff
pub async fn launch_checkout(
    State(state): State<CheckoutAppState>,
    Path(checkout_id): Path<CheckoutId>,
) -> Result<impl IntoResponse, ApiError> {
    let handler = state.launch_checkout_handler();
    let result = handler.handle(LaunchCheckoutCommand { checkout_id }).await?;

    let response = LaunchResponse {
        session_id: result.session_id.as_str().to_string(),
        reference: result.reference,
        checkout_url: result.checkout_url,
        resume_url: result.resume_url,
    };
    Ok(Json(response))
}

/// GET /api/checkout/:id/return - Land the user back from the gateway
pub async fn gateway_return(
    State(state): State<CheckoutAppState>,
    Path(checkout_id): Path<CheckoutId>,
    Query(params): Query<std::collections::HashMap<String, String>>,
) -> Result<impl IntoResponse, ApiError> {
    let handler = state.gateway_return_handler();
    let result = handler
        .handle(HandleGatewayReturnCommand {
            checkout_id,
            params,
        })
        .await?;

    let response = ReturnResponse {
        reference: result.reference,
        flow: FlowResponse::from(result.flow),
    };
    Ok(Json(response))
}

/// POST /api/checkout/:id/verify - Verify activation with the gateway
pub async fn verify_checkout(
    State(state): State<CheckoutAppState>,
    Path(checkout_id): Path<CheckoutId>,
) -> Result<impl IntoResponse, ApiError> {
    let handler = state.verify_activation_handler();
    let result = handler.handle(VerifyActivationCommand { checkout_id }).await?;

    let response = VerificationResponse {
        checkout_id: result.checkout_id.to_string(),
        reference: result.reference,
        outcome: result.outcome,
    };
    Ok(Json(response))
}

/// POST /api/checkout/:id/coupon - Apply a coupon code
pub async fn apply_coupon(
    State(state): State<CheckoutAppState>,
    Path(checkout_id): Path<CheckoutId>,
    Json(request): Json<ApplyCouponRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let handler = state.apply_coupon_handler();
    let result = handler
        .handle(ApplyCouponCommand {
            checkout_id,
            code: request.code,
        })
        .await?;

    let response = CouponAppliedResponse {
        code: result
            .flow
            .coupon
            .as_ref()
            .map(|c| c.code.clone())
            .unwrap_or_default(),
        discount_minor: result.discount.discount_minor,
        final_amount_minor: result.discount.final_amount_minor,
        flow: FlowResponse::from(result.flow),
    };
    Ok(Json(response))
}

/// DELETE /api/checkout/:id - Cancel the current attempt
pub async fn cancel_checkout(
    State(state): State<CheckoutAppState>,
    Path(checkout_id): Path<CheckoutId>,
) -> Result<impl IntoResponse, ApiError> {
    let handler = state.cancel_checkout_handler();
    let result = handler.handle(CancelCheckoutCommand { checkout_id }).await?;

    Ok(Json(FlowResponse::from(result.flow)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Webhook Endpoint
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/webhooks/gateway - Handle payment gateway webhook events
///
/// The signature and timestamp arrive in headers; the checkout id, when
/// present, rides the notify URL's query string.
pub async fn handle_gateway_webhook(
    State(state): State<CheckoutAppState>,
    Query(query): Query<WebhookQuery>,
    headers: axum::http::HeaderMap,
    body: axum::body::Bytes,
) -> Result<impl IntoResponse + std::fmt::Debug, ApiError> {
    let signature = headers
        .get("x-webhook-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            ApiError::from(DomainError::validation(
                "x-webhook-signature",
                "Missing x-webhook-signature header",
            ))
        })?;
    let timestamp = headers
        .get("x-webhook-timestamp")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            ApiError::from(DomainError::validation(
                "x-webhook-timestamp",
                "Missing x-webhook-timestamp header",
            ))
        })?;

    // An unparseable checkout id only loses the correlation, never the event.
    let checkout_id = query.checkout_id.as_deref().and_then(|raw| {
        raw.parse::<CheckoutId>()
            .map_err(|e| {
                tracing::warn!(raw, error = %e, "Ignoring malformed checkout_id on webhook");
            })
            .ok()
    });

    let handler = state.webhook_handler();
    handler
        .handle(HandleGatewayWebhookCommand {
            payload: body.to_vec(),
            signature: signature.to_string(),
            timestamp: timestamp.to_string(),
            checkout_id,
        })
        .await?;

    Ok(StatusCode::OK)
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts domain errors to HTTP responses.
#[derive(Debug)]
pub struct ApiError(DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.0.code {
            ErrorCode::ValidationFailed
            | ErrorCode::EmptyField
            | ErrorCode::InvalidFormat
            | ErrorCode::MinimumOrderValue => StatusCode::BAD_REQUEST,
            ErrorCode::FlowNotFound | ErrorCode::BundleNotFound | ErrorCode::CouponNotFound => {
                StatusCode::NOT_FOUND
            }
            ErrorCode::FlowExpired | ErrorCode::ConsentExpired => StatusCode::GONE,
            ErrorCode::InvalidStateTransition
            | ErrorCode::AlreadySubscribed
            | ErrorCode::PaymentPending => StatusCode::CONFLICT,
            ErrorCode::AuthenticationRequired | ErrorCode::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::GatewayError | ErrorCode::EsignError | ErrorCode::ExternalServiceError => {
                StatusCode::BAD_GATEWAY
            }
            ErrorCode::StorageError | ErrorCode::CacheError | ErrorCode::InternalError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = if self.0.details.is_empty() {
            ErrorResponse::new(self.0.code.to_string(), self.0.message)
        } else {
            ErrorResponse::with_details(
                self.0.code.to_string(),
                self.0.message,
                serde_json::json!(self.0.details),
            )
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::auth::MockIdentityProvider;
    use crate::adapters::cache::InMemoryEntitlementCache;
    use crate::adapters::cashfree::MockGateway;
    use crate::adapters::catalog::StaticBundleCatalog;
    use crate::adapters::coupon::StaticCouponRegistry;
    use crate::adapters::esign::MockEsignProvider;
    use crate::adapters::storage::InMemoryFlowStore;
    use crate::domain::checkout::StepKind;
    use crate::domain::plan::{BillingCycle, Bundle, CyclePricing};

    // ════════════════════════════════════════════════════════════════════════════
    // Test Helpers
    // ════════════════════════════════════════════════════════════════════════════

    fn test_state() -> CheckoutAppState {
        let catalog = StaticBundleCatalog::new().with_bundle(Bundle::new(
            BundleId::new("premium").unwrap(),
            "Premium",
            CyclePricing {
                monthly: Some(99_900),
                yearly: Some(999_000),
                ..Default::default()
            },
        ));

        CheckoutAppState {
            flow_store: Arc::new(InMemoryFlowStore::new(2700)),
            gateway: Arc::new(MockGateway::new()),
            esign: Arc::new(MockEsignProvider::new()),
            identity: Arc::new(
                MockIdentityProvider::new().with_account("user@example.com", "hunter2", "u1"),
            ),
            coupons: Arc::new(StaticCouponRegistry::new()),
            catalog: Arc::new(catalog),
            entitlements: Arc::new(InMemoryEntitlementCache::new(300)),
        }
    }

    async fn started_checkout(state: &CheckoutAppState, cycle: BillingCycle) -> CheckoutId {
        state
            .select_plan_handler()
            .handle(SelectPlanCommand {
                bundle_id: BundleId::new("premium").unwrap(),
                cycle,
            })
            .await
            .unwrap()
            .checkout_id
    }

    fn login_request() -> AuthRequest {
        AuthRequest::Login {
            email: "user@example.com".to_string(),
            password: "hunter2".to_string(),
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Handler Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn list_bundles_returns_catalog() {
        let result = list_bundles(State(test_state())).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn start_checkout_returns_created() {
        let request = StartCheckoutRequest {
            bundle_id: "premium".to_string(),
            cycle: BillingCycle::Monthly,
        };

        let response = start_checkout(State(test_state()), Json(request))
            .await
            .unwrap()
            .into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn start_checkout_unknown_bundle_is_404() {
        let request = StartCheckoutRequest {
            bundle_id: "nonexistent".to_string(),
            cycle: BillingCycle::Monthly,
        };

        let err = start_checkout(State(test_state()), Json(request))
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn monthly_flow_reaches_hosted_checkout() {
        let state = test_state();
        let checkout_id = started_checkout(&state, BillingCycle::Monthly).await;

        authenticate(
            State(state.clone()),
            Path(checkout_id),
            None,
            Json(login_request()),
        )
        .await
        .unwrap();

        let response = place_order(
            State(state.clone()),
            Path(checkout_id),
            Json(PlaceOrderRequest {
                return_url: "https://app.test/checkout/return".to_string(),
            }),
        )
        .await
        .unwrap()
        .into_response();
        assert_eq!(response.status(), StatusCode::CREATED);

        let launch = launch_checkout(State(state.clone()), Path(checkout_id)).await;
        assert!(launch.is_ok());

        let stored = state.flow_store.load(checkout_id).await.unwrap();
        assert_eq!(stored.step.kind(), StepKind::GatewayRedirect);
    }

    #[tokio::test]
    async fn get_checkout_returns_flow_state() {
        let state = test_state();
        let checkout_id = started_checkout(&state, BillingCycle::Monthly).await;

        let result = get_checkout(State(state), Path(checkout_id)).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn get_missing_checkout_is_404() {
        let err = get_checkout(State(test_state()), Path(CheckoutId::new()))
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn resume_without_bearer_token_is_401() {
        let state = test_state();
        let checkout_id = started_checkout(&state, BillingCycle::Monthly).await;

        let err = authenticate(
            State(state),
            Path(checkout_id),
            None,
            Json(AuthRequest::Resume {}),
        )
        .await
        .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn cancel_returns_flow_to_plan() {
        let state = test_state();
        let checkout_id = started_checkout(&state, BillingCycle::Monthly).await;

        authenticate(
            State(state.clone()),
            Path(checkout_id),
            None,
            Json(login_request()),
        )
        .await
        .unwrap();

        cancel_checkout(State(state.clone()), Path(checkout_id))
            .await
            .unwrap();

        let stored = state.flow_store.load(checkout_id).await.unwrap();
        assert_eq!(stored.step.kind(), StepKind::Plan);
    }

    #[tokio::test]
    async fn webhook_without_signature_header_is_400() {
        let err = handle_gateway_webhook(
            State(test_state()),
            Query(WebhookQuery { checkout_id: None }),
            axum::http::HeaderMap::new(),
            axum::body::Bytes::from_static(b"{}"),
        )
        .await
        .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn webhook_with_headers_is_acknowledged() {
        let mut headers = axum::http::HeaderMap::new();
        headers.insert("x-webhook-signature", "sig".parse().unwrap());
        headers.insert("x-webhook-timestamp", "1700000000".parse().unwrap());

        let payload = serde_json::json!({
            "type": "PAYMENT_SUCCESS_WEBHOOK",
            "data": { "order": { "order_id": "ord_1", "order_status": "PAID" } }
        })
        .to_string();

        let result = handle_gateway_webhook(
            State(test_state()),
            Query(WebhookQuery {
                checkout_id: Some("not-a-uuid".to_string()),
            }),
            headers,
            axum::body::Bytes::from(payload),
        )
        .await;
        assert!(result.is_ok());
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Error Mapping Tests
    // ════════════════════════════════════════════════════════════════════════════

    fn status_for(code: ErrorCode) -> StatusCode {
        ApiError(DomainError::new(code, "test"))
            .into_response()
            .status()
    }

    #[test]
    fn api_error_maps_not_found_codes_to_404() {
        assert_eq!(status_for(ErrorCode::FlowNotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_for(ErrorCode::BundleNotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_for(ErrorCode::CouponNotFound), StatusCode::NOT_FOUND);
    }

    #[test]
    fn api_error_maps_already_subscribed_to_409() {
        assert_eq!(status_for(ErrorCode::AlreadySubscribed), StatusCode::CONFLICT);
    }

    #[test]
    fn api_error_maps_invalid_transition_to_409() {
        assert_eq!(
            status_for(ErrorCode::InvalidStateTransition),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn api_error_maps_expiries_to_410() {
        assert_eq!(status_for(ErrorCode::FlowExpired), StatusCode::GONE);
        assert_eq!(status_for(ErrorCode::ConsentExpired), StatusCode::GONE);
    }

    #[test]
    fn api_error_maps_auth_codes_to_401() {
        assert_eq!(
            status_for(ErrorCode::AuthenticationRequired),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_for(ErrorCode::InvalidCredentials),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn api_error_maps_forbidden_to_403() {
        assert_eq!(status_for(ErrorCode::Forbidden), StatusCode::FORBIDDEN);
    }

    #[test]
    fn api_error_maps_provider_failures_to_502() {
        assert_eq!(status_for(ErrorCode::GatewayError), StatusCode::BAD_GATEWAY);
        assert_eq!(status_for(ErrorCode::EsignError), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn api_error_maps_infrastructure_to_500() {
        assert_eq!(
            status_for(ErrorCode::StorageError),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn api_error_maps_validation_to_400() {
        assert_eq!(
            status_for(ErrorCode::ValidationFailed),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(ErrorCode::MinimumOrderValue),
            StatusCode::BAD_REQUEST
        );
    }
}
