// ==========================================
// ParcelImporter 集成测试
// ==========================================
// 测试目标: 真实 SQLite + 真实导出目录下的完整导入流程
// ==========================================


use parcel_dispatch::config::{config_keys, ConfigManager};
use parcel_dispatch::domain::ParcelStatus;
use parcel_dispatch::importer::{
    CsvRejectedExporter, FieldMapperImpl, ImportError, ParcelImporter, ParcelImporterImpl,
    PhoneDuplicateClassifier, UniversalFileParser,
};
use parcel_dispatch::logging;
use parcel_dispatch::repository::ParcelRepository;
use tempfile::TempDir;
use test_helpers::{
    create_test_db, csv_content, insert_parcel, insert_test_config, sample_parcel, valid_row,
};

/// 创建测试用的 ParcelImporter 实例
fn create_test_importer(
    db_path: &str,
    export_dir: &TempDir,
) -> ParcelImporterImpl<ParcelRepository, ConfigManager> {
    let import_repo = ParcelRepository::new(db_path).expect("Failed to create ParcelRepository");
    let config = ConfigManager::new(db_path).expect("Failed to create ConfigManager");

    ParcelImporterImpl::new(
        import_repo,
        config,
        Box::new(UniversalFileParser),
        Box::new(FieldMapperImpl),
        Box::new(PhoneDuplicateClassifier::new()),
        Box::new(CsvRejectedExporter::new(export_dir.path())),
    )
}

fn read_rejected(export_dir: &TempDir, name: &str) -> Vec<csv::StringRecord> {
    let bytes = CsvRejectedExporter::new(export_dir.path())
        .read_export(name)
        .expect("rejected file should exist");
    csv::Reader::from_reader(bytes.as_slice())
        .records()
        .map(|r| r.expect("valid csv record"))
        .collect()
}

#[tokio::test]
async fn test_import_mixed_batch() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let export_dir = TempDir::new().unwrap();

    // 库中已有 9876543210
    insert_parcel(&db_path, &sample_parcel("Existing Customer", "9876543210", Some(1.0)));

    let rows = [
        valid_row("Asha Raman", "9000000001"),                // 1: 接受
        valid_row("Bala Murugan", "+91 98765-43210"),         // 2: 库中已存在（规范化后相同）
        valid_row("Chitra Devi", "9000000002"),               // 3: 批内首次出现，接受
        "Deepa,9000000003,2.5,600001,short,13.08,80.27,".to_string(), // 4: 地址过短
        valid_row("Chitra Devi", "90000 00002"),              // 5: 批内重复
        valid_row("Esha Nair", "9000000004"),                 // 6: 接受
    ];
    let row_refs: Vec<&str> = rows.iter().map(String::as_str).collect();

    let importer = create_test_importer(&db_path, &export_dir);
    let report = importer
        .import_upload("parcels.csv", &csv_content(&row_refs))
        .await
        .expect("import should succeed");

    assert_eq!(report.total_rows, 6);
    assert_eq!(report.success_count, 3);
    assert_eq!(report.error_count, 1);
    assert_eq!(report.duplicate_count, 2);
    assert!(!report.batch_id.is_empty());
    assert_eq!(
        report.errors,
        vec!["Row 4: Address must be at least 10 characters long".to_string()]
    );

    // 拒绝文件按行号排序，包含所有被拒行
    let name = report.rejected_file.expect("rejected file expected");
    let records = read_rejected(&export_dir, &name);
    let summary: Vec<(String, String)> = records
        .iter()
        .map(|r| (r[0].to_string(), r[9].to_string()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("2".to_string(), "Phone number already exists in database".to_string()),
            ("4".to_string(), "Address must be at least 10 characters long".to_string()),
            ("5".to_string(), "Duplicate phone number within CSV file".to_string()),
        ]
    );
    // 原值回写
    assert_eq!(&records[0][2], "+91 98765-43210");

    // 库中新增三条
    let repo = ParcelRepository::new(&db_path).unwrap();
    let phones = repo.list_phone_numbers().unwrap();
    assert_eq!(phones.len(), 4);
    assert!(phones.contains("9000000001"));
    assert!(phones.contains("9000000002"));
    assert!(phones.contains("9000000004"));
}

#[tokio::test]
async fn test_blank_row_keeps_file_positions() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let export_dir = TempDir::new().unwrap();
    let importer = create_test_importer(&db_path, &export_dir);

    let rows = [
        valid_row("Asha Raman", "9000000001"),                   // 1: 接受
        ",,,,,,,".to_string(),                                   // 2: 全空行
        " Bala Murugan , 9000000002 ,2,600001,short,,,".to_string(), // 3: 地址过短
        valid_row("Chitra Devi", "9000000003"),                  // 4: 接受
    ];
    let row_refs: Vec<&str> = rows.iter().map(String::as_str).collect();

    let report = importer
        .import_upload("parcels.csv", &csv_content(&row_refs))
        .await
        .expect("import should succeed");

    assert_eq!(report.total_rows, 4);
    assert_eq!(report.success_count, 2);
    assert_eq!(report.error_count, 2);
    assert_eq!(
        report.errors,
        vec![
            "Row 2: Full name is required, Phone number is required, Address is required"
                .to_string(),
            "Row 3: Address must be at least 10 characters long".to_string(),
        ]
    );

    let name = report.rejected_file.expect("rejected file expected");
    let records = read_rejected(&export_dir, &name);
    let row_numbers: Vec<&str> = records.iter().map(|r| &r[0]).collect();
    assert_eq!(row_numbers, vec!["2", "3"]);
    // 上传原文回写，不做 trim
    assert_eq!(&records[1][1], " Bala Murugan ");
    assert_eq!(&records[1][2], " 9000000002 ");
}

#[tokio::test]
async fn test_clean_batch_has_no_rejected_file() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let export_dir = TempDir::new().unwrap();
    let importer = create_test_importer(&db_path, &export_dir);

    let rows = [
        valid_row("Asha Raman", "9000000001"),
        valid_row("Bala Murugan", "9000000002"),
    ];
    let row_refs: Vec<&str> = rows.iter().map(String::as_str).collect();
    let report = importer
        .import_upload("parcels.csv", &csv_content(&row_refs))
        .await
        .unwrap();

    assert_eq!(report.success_count, 2);
    assert_eq!(report.error_count + report.duplicate_count, 0);
    assert!(report.rejected_file.is_none());
    assert!(report.errors.is_empty());
}

#[tokio::test]
async fn test_reimporting_same_file_rejects_everything() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let export_dir = TempDir::new().unwrap();
    let importer = create_test_importer(&db_path, &export_dir);

    let rows = [valid_row("Asha Raman", "9000000001")];
    let row_refs: Vec<&str> = rows.iter().map(String::as_str).collect();
    let content = csv_content(&row_refs);

    let first = importer.import_upload("parcels.csv", &content).await.unwrap();
    assert_eq!(first.success_count, 1);

    let second = importer.import_upload("parcels.csv", &content).await.unwrap();
    assert_eq!(second.success_count, 0);
    assert_eq!(second.duplicate_count, 1);
    assert_ne!(first.batch_id, second.batch_id);
}

#[tokio::test]
async fn test_imported_status_rules() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let export_dir = TempDir::new().unwrap();
    let importer = create_test_importer(&db_path, &export_dir);

    let content = csv_content(&[
        "Asha Raman,9000000001,1,600001,12 Anna Salai Chennai,13.08,80.27,PENDING",
        "Bala Murugan,9000000002,1,600001,12 Anna Salai Chennai,13.08,80.27,in_transit",
        "Chitra Devi,9000000003,,,12 Anna Salai Chennai,,,",
    ]);
    let report = importer.import_upload("parcels.csv", &content).await.unwrap();
    assert_eq!(report.success_count, 3);

    let repo = ParcelRepository::new(&db_path).unwrap();
    let mut parcels: Vec<_> = repo
        .list_with_driver()
        .unwrap()
        .into_iter()
        .map(|item| item.parcel)
        .collect();
    parcels.sort_by(|a, b| a.phone_number.cmp(&b.phone_number));

    assert_eq!(parcels[0].status, ParcelStatus::Pending);
    // 导入包裹没有司机，需要司机的状态回落为 unassigned
    assert_eq!(parcels[1].status, ParcelStatus::Unassigned);
    assert_eq!(parcels[2].weight, None);
    assert_eq!(parcels[2].pin_code, None);
    assert!(parcels.iter().all(|p| p.assigned_driver_id.is_none()));
}

#[tokio::test]
async fn test_reported_errors_follow_config_limit() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let conn = rusqlite::Connection::open(&db_path).unwrap();
    insert_test_config(&conn, config_keys::MAX_REPORTED_ERRORS, "3").unwrap();

    let export_dir = TempDir::new().unwrap();
    let importer = create_test_importer(&db_path, &export_dir);

    let bad_rows: Vec<String> = (0..5)
        .map(|i| format!("Customer,90000000{:02},abc,600001,12 Anna Salai Chennai,,,", i))
        .collect();
    let row_refs: Vec<&str> = bad_rows.iter().map(String::as_str).collect();

    let report = importer
        .import_upload("parcels.csv", &csv_content(&row_refs))
        .await
        .unwrap();

    assert_eq!(report.error_count, 5);
    assert_eq!(report.errors.len(), 3);
    assert_eq!(report.errors[0], "Row 1: Weight must be a valid number");
    // 拒绝文件不截断
    let records = read_rejected(&export_dir, report.rejected_file.as_deref().unwrap());
    assert_eq!(records.len(), 5);
}

#[tokio::test]
async fn test_unsupported_format_writes_nothing() {
    logging::init_test();

    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let export_dir = TempDir::new().unwrap();
    let importer = create_test_importer(&db_path, &export_dir);

    let rows = [valid_row("Asha Raman", "9000000001")];
    let row_refs: Vec<&str> = rows.iter().map(String::as_str).collect();
    let result = importer
        .import_upload("parcels.pdf", &csv_content(&row_refs))
        .await;

    assert!(matches!(result, Err(ImportError::UnsupportedFormat(_))));
    let repo = ParcelRepository::new(&db_path).unwrap();
    assert!(repo.list_phone_numbers().unwrap().is_empty());
}
