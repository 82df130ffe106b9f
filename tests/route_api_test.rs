// ==========================================
// RouteApi / DashboardApi 集成测试
// ==========================================
// 测试目标: 司机路线分组、工作量排序、驾驶舱统计
// ==========================================


use parcel_dispatch::api::{ApiError, AssignRequest, StatusRequest};
use parcel_dispatch::logging;
use tempfile::TempDir;
use test_helpers::{
    create_test_db, create_test_state, insert_driver, insert_parcel, sample_driver, sample_parcel,
};

#[test]
fn test_driver_routes_partition_in_creation_order() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().unwrap();
    let export_dir = TempDir::new().unwrap();
    let state = create_test_state(&db_path, export_dir.path());

    let driver_id = insert_driver(&db_path, &sample_driver("Ravi Kumar", "9876543210", "TN48BS1234"));
    let mut parcel_ids = Vec::new();
    for i in 0..11 {
        let weight = if i % 2 == 0 { Some(2.0) } else { None };
        let id = insert_parcel(
            &db_path,
            &sample_parcel("Asha Raman", &format!("90000000{:02}", i), weight),
        );
        state
            .parcel_api
            .assign_parcel(id, &AssignRequest { driver_id: Some(driver_id) })
            .unwrap();
        parcel_ids.push(id);
    }

    let routes = state.route_api.get_driver_routes(driver_id).unwrap();
    assert_eq!(routes.driver.id, driver_id);
    assert_eq!(routes.total_parcels, 11);
    assert_eq!(routes.total_routes, 4);

    let sizes: Vec<usize> = routes.routes.iter().map(|r| r.parcel_count).collect();
    assert_eq!(sizes, vec![4, 3, 3, 1]);

    let ordered: Vec<i64> = routes
        .routes
        .iter()
        .flat_map(|r| r.parcels.iter().map(|p| p.id))
        .collect();
    assert_eq!(ordered, parcel_ids);

    // 第 1 组: 2.0 + 0 + 2.0 + 0
    assert!((routes.routes[0].total_weight - 4.0).abs() < 1e-9);
    assert_eq!(routes.routes[0].route_name, "Route 1");
    assert_eq!(routes.routes[3].route_color, "#96CEB4");
}

#[test]
fn test_driver_routes_empty_and_unknown() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let export_dir = TempDir::new().unwrap();
    let state = create_test_state(&db_path, export_dir.path());

    let driver_id = insert_driver(&db_path, &sample_driver("Ravi Kumar", "9876543210", "TN48BS1234"));
    let routes = state.route_api.get_driver_routes(driver_id).unwrap();
    assert_eq!(routes.total_parcels, 0);
    assert!(routes.routes.is_empty());

    let mut inactive = sample_driver("Arun Prakash", "9000000001", "TN48BS9999");
    inactive.is_active = false;
    let inactive_id = insert_driver(&db_path, &inactive);

    for id in [inactive_id, 999] {
        match state.route_api.get_driver_routes(id) {
            Err(ApiError::NotFound(msg)) => assert_eq!(msg, "Driver not found or inactive"),
            other => panic!("Expected NotFound, got {:?}", other.map(|r| r.total_parcels)),
        }
    }
}

#[test]
fn test_workloads_ordered_by_total_then_name() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let export_dir = TempDir::new().unwrap();
    let state = create_test_state(&db_path, export_dir.path());

    let busy = insert_driver(&db_path, &sample_driver("Zara Khan", "9876543210", "TN48BS1234"));
    insert_driver(&db_path, &sample_driver("Bala Murugan", "9000000001", "TN48BS1111"));
    insert_driver(&db_path, &sample_driver("Arun Prakash", "9000000002", "TN48BS2222"));
    let mut inactive = sample_driver("Chitra Devi", "9000000003", "TN48BS3333");
    inactive.is_active = false;
    insert_driver(&db_path, &inactive);

    for i in 0..3 {
        let id = insert_parcel(
            &db_path,
            &sample_parcel("Asha Raman", &format!("80000000{:02}", i), None),
        );
        state
            .parcel_api
            .assign_parcel(id, &AssignRequest { driver_id: Some(busy) })
            .unwrap();
        if i == 0 {
            state
                .parcel_api
                .update_parcel_status(
                    id,
                    &StatusRequest {
                        status: Some("completed".to_string()),
                    },
                )
                .unwrap();
        }
    }

    let workloads = state.route_api.list_driver_workloads().unwrap();
    let names: Vec<&str> = workloads.iter().map(|w| w.driver_name.as_str()).collect();
    assert_eq!(names, vec!["Zara Khan", "Arun Prakash", "Bala Murugan"]);

    let top = &workloads[0];
    assert_eq!(top.total_parcels, 3);
    assert_eq!(top.assigned_parcels, 2);
    assert_eq!(top.completed_parcels, 1);
    assert_eq!(top.in_transit_parcels, 0);
}

#[test]
fn test_dashboard_stats() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let export_dir = TempDir::new().unwrap();
    let state = create_test_state(&db_path, export_dir.path());

    let driver_id = insert_driver(&db_path, &sample_driver("Ravi Kumar", "9876543210", "TN48BS1234"));
    let mut inactive = sample_driver("Arun Prakash", "9000000001", "TN48BS9999");
    inactive.is_active = false;
    insert_driver(&db_path, &inactive);

    let a = insert_parcel(&db_path, &sample_parcel("Asha Raman", "9000000011", None));
    insert_parcel(&db_path, &sample_parcel("Bala Murugan", "9000000012", None));
    state
        .parcel_api
        .assign_parcel(a, &AssignRequest { driver_id: Some(driver_id) })
        .unwrap();

    let stats = state.dashboard_api.dashboard_stats().unwrap();
    assert_eq!(stats.parcels.total_parcels, 2);
    assert_eq!(stats.parcels.assigned, 1);
    assert_eq!(stats.parcels.unassigned, 1);
    assert_eq!(stats.parcels.pending, 0);
    assert_eq!(stats.drivers.total_drivers, 2);
    assert_eq!(stats.drivers.active_drivers, 1);
}
