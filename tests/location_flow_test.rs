use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use nearby_places::{
    platform::{PermissionStatus, PlatformError, SimulatedPlatform},
    services::{
        DeviceLocationProvider, LocationProvider, LocationService, LocationStatus,
        MockPlaceGenerator, DEFAULT_FALLBACK,
    },
    session::{AppLifecycleState, NearbySession, ScreenView},
    Coordinate, FetchOutcome, FixSource, PendingReason,
};
use rstest::rstest;

fn service_over(platform: Arc<SimulatedPlatform>) -> LocationService {
    LocationService::new(
        Arc::new(DeviceLocationProvider::new(platform)),
        Arc::new(MockPlaceGenerator::default()),
    )
}

fn fallback() -> Coordinate {
    Coordinate::new(28.4595, 77.0266).unwrap()
}

#[tokio::test]
async fn fallback_center_yields_ten_sorted_places() {
    let platform = Arc::new(SimulatedPlatform::new().with_fix(fallback()));
    let outcome = service_over(platform).fetch_location_and_places().await;

    let result = assert_matches!(outcome, FetchOutcome::Success(result) => result);
    assert_eq!(result.location, fallback());
    assert_eq!(result.places.len(), 10);
    assert!(result
        .places
        .windows(2)
        .all(|pair| pair[0].distance_meters <= pair[1].distance_meters));

    let distance_of = |name: &str| {
        result
            .places
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.distance_meters)
            .unwrap()
    };
    assert!(distance_of("Pizza Hut") <= distance_of("Shopping Mall"));
}

#[tokio::test]
async fn denied_and_never_asked_requests_permission_without_coordinate() {
    let platform = Arc::new(
        SimulatedPlatform::new()
            .with_permission(PermissionStatus::Denied)
            .with_fix(fallback()),
    );
    let provider = DeviceLocationProvider::new(platform.clone());

    let status = provider.current_location().await.unwrap();

    assert_eq!(status, LocationStatus::PermissionPending);
    assert_eq!(platform.permission_requests(), 1);
    assert_eq!(platform.fix_requests(), 0);
}

#[tokio::test]
async fn granted_but_disabled_reports_services_disabled() {
    let platform = Arc::new(
        SimulatedPlatform::new()
            .with_services_enabled(false)
            .with_fix(fallback()),
    );
    let provider = DeviceLocationProvider::new(platform.clone());

    assert_eq!(
        provider.current_location().await.unwrap(),
        LocationStatus::ServicesDisabled
    );
    assert_eq!(platform.settings_opened(), 1);
}

#[rstest]
#[case(PlatformError::Timeout)]
#[case(PlatformError::NoFixAvailable)]
#[case(PlatformError::Hardware("antenna".into()))]
#[case(PlatformError::PermissionRevoked)]
#[tokio::test]
async fn platform_failures_resolve_to_fallback(#[case] error: PlatformError) {
    let platform = Arc::new(SimulatedPlatform::new().with_fix_error(error));
    let provider = DeviceLocationProvider::new(platform.clone());

    let status = provider.current_location().await.unwrap();

    assert_eq!(
        status,
        LocationStatus::Ready {
            coordinate: DEFAULT_FALLBACK,
            source: FixSource::Fallback,
        }
    );
    assert_eq!(DEFAULT_FALLBACK, fallback());
    assert_eq!(platform.open_sessions(), 0);
}

#[rstest]
#[case(PermissionStatus::Denied, true, PendingReason::PermissionPending)]
#[case(PermissionStatus::Granted, false, PendingReason::LocationServicesDisabled)]
#[tokio::test]
async fn pending_signals_become_noop(
    #[case] permission: PermissionStatus,
    #[case] services_enabled: bool,
    #[case] expected: PendingReason,
) {
    let platform = Arc::new(
        SimulatedPlatform::new()
            .with_permission(permission)
            .with_services_enabled(services_enabled),
    );

    let outcome = service_over(platform).fetch_location_and_places().await;

    assert_matches!(outcome, FetchOutcome::NoOp { reason } if reason == expected);
}

#[tokio::test]
async fn permission_granted_on_prompt_succeeds_on_next_trigger() {
    let here = Coordinate::new(12.9716, 77.5946).unwrap();
    let platform = Arc::new(
        SimulatedPlatform::new()
            .with_permission(PermissionStatus::Denied)
            .with_grant_on_request(true)
            .with_fix(here),
    );
    let service = service_over(platform.clone());

    assert!(service.fetch_location_and_places().await.is_noop());

    let outcome = service.fetch_location_and_places().await;
    let result = assert_matches!(outcome, FetchOutcome::Success(result) => result);
    assert_eq!(result.location, here);
    assert_eq!(result.source, FixSource::Device);
    assert_eq!(platform.permission_requests(), 1);
}

#[tokio::test]
async fn abandoned_fetch_releases_location_session() {
    let platform = Arc::new(
        SimulatedPlatform::new()
            .with_fix(fallback())
            .with_fix_delay(Duration::from_secs(30)),
    );
    let service = service_over(platform.clone());

    let abandoned =
        tokio::time::timeout(Duration::from_millis(20), service.fetch_location_and_places()).await;

    assert!(abandoned.is_err());
    assert_eq!(platform.fix_requests(), 1);
    assert_eq!(platform.open_sessions(), 0);
}

#[tokio::test]
async fn overlapping_fetches_are_independent() {
    let platform = Arc::new(
        SimulatedPlatform::new()
            .with_fix(fallback())
            .with_fix_delay(Duration::from_millis(5)),
    );
    let service = service_over(platform.clone());

    let (first, second) = tokio::join!(
        service.fetch_location_and_places(),
        service.fetch_location_and_places()
    );

    assert_eq!(first, second);
    assert!(first.is_success());
    assert_eq!(platform.open_sessions(), 0);
}

#[tokio::test]
async fn session_follows_lifecycle() {
    let platform = Arc::new(
        SimulatedPlatform::new()
            .with_permission(PermissionStatus::Denied)
            .with_fix(fallback()),
    );
    let session = NearbySession::new(service_over(platform.clone()));

    // first mount raises the prompt and keeps the spinner
    assert_eq!(session.mount().await, ScreenView::Loading);

    // the user grants it in the system dialog, then comes back
    platform.set_permission(PermissionStatus::Granted);
    assert!(session
        .on_lifecycle_change(AppLifecycleState::Background)
        .await
        .is_none());
    let view = session
        .on_lifecycle_change(AppLifecycleState::Active)
        .await
        .expect("active transition refreshes");
    let result = assert_matches!(view, ScreenView::Map(result) => result);
    assert_eq!(result.places.len(), 10);

    // services switched off afterwards: the map stays
    platform.set_services_enabled(false);
    let view = session
        .on_lifecycle_change(AppLifecycleState::Active)
        .await
        .unwrap();
    assert_matches!(view, ScreenView::Map(_));
    assert_eq!(session.snapshot().revision, 3);
}
