use super::*;

#[tokio::test]
async fn test_networking_manager_creation() {
    let manager = NetworkingManager::new(NetworkingConfig::default()).unwrap();
    assert_eq!(manager.max_jobs(), 4);
}

#[test]
fn test_zero_jobs_rejected() {
    let config = NetworkingConfig {
        max_jobs: 0,
        ..Default::default()
    };
    assert!(matches!(
        NetworkingManager::new(config),
        Err(NetworkingError::InvalidJobCount { count: 0 })
    ));
}

#[tokio::test]
async fn test_permits_bound_concurrency() {
    let config = NetworkingConfig {
        max_jobs: 2,
        ..Default::default()
    };
    let manager = NetworkingManager::new(config).unwrap();

    let first = manager.acquire().await.unwrap();
    let _second = manager.acquire().await.unwrap();

    // Pool exhausted: a third acquire must wait until a permit drops
    let third = tokio::time::timeout(Duration::from_millis(50), manager.acquire()).await;
    assert!(third.is_err());

    drop(first);
    let third = tokio::time::timeout(Duration::from_millis(50), manager.acquire()).await;
    assert!(third.is_ok());
}

#[test]
fn test_user_agent_names_crate() {
    assert!(USER_AGENT.starts_with("deptrace/"));
}
