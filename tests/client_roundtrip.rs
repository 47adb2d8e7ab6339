//! Drives a live server through `GridClient`.

use std::sync::Arc;

use pricegrid_rs::api::{router, serve_with_listener, AppState};
use pricegrid_rs::client::GridClient;
use pricegrid_rs::engine::view::{AxisFilter, GridView};
use pricegrid_rs::{AppConfig, Grid, GridPolicy, GridStore};

async fn spawn_server(grid: Grid) -> GridClient {
    let store = Arc::new(GridStore::new(grid, GridPolicy::default()));
    let app = router(AppState::new(store), &AppConfig::default());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(serve_with_listener(listener, app, std::future::pending()));
    GridClient::new(&format!("http://{}", addr))
}

fn scenario_grid() -> Grid {
    Grid {
        heights: vec![10.0, 20.0],
        widths: vec![5.0],
        prices: vec![vec![100.0], vec![200.0]],
    }
}

#[tokio::test]
async fn test_client_scenario() {
    let client = spawn_server(scenario_grid()).await;

    let grid = client.fetch().await.unwrap();
    assert_eq!(grid, scenario_grid());

    let grid = client.add_column(8.0).await.unwrap();
    assert_eq!(grid.prices, vec![vec![100.0, 0.0], vec![200.0, 0.0]]);

    let grid = client.set_cell(1, 1, 150.0).await.unwrap();
    assert_eq!(grid.prices, vec![vec![100.0, 0.0], vec![200.0, 150.0]]);

    let grid = client.add_row(30.0, &[300.0, 400.0]).await.unwrap();
    assert_eq!(grid.heights, vec![10.0, 20.0, 30.0]);
    assert_eq!(grid.prices[2], vec![300.0, 400.0]);

    let view = GridView::build(&grid, AxisFilter::Label(20.0), AxisFilter::Label(8.0));
    assert_eq!(view.rows.len(), 1);
    assert_eq!(view.rows[0].cells, vec![(1, 150.0)]);
}

#[tokio::test]
async fn test_client_surfaces_server_message() {
    let client = spawn_server(scenario_grid()).await;

    let err = client.set_cell(5, 0, 1.0).await.unwrap_err();
    assert_eq!(err.to_string(), "Error 400: row index 5 out of range (grid has 2 rows)");

    let err = client.add_row(30.0, &[1.0, 2.0]).await.unwrap_err();
    assert!(err.to_string().contains("prices has 2 values"));

    let err = client.add_column(5.0).await.unwrap_err();
    assert_eq!(err.to_string(), "Error 400: width 5 already exists");

    assert_eq!(client.fetch().await.unwrap(), scenario_grid());
}

#[tokio::test]
async fn test_client_reports_unreachable_server() {
    // Bind and drop to get a port nothing listens on.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = GridClient::new(&format!("http://{}/", addr));
    let err = client.fetch().await.unwrap_err();
    assert!(err.to_string().contains("failed to reach"));
}
