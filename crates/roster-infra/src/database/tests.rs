#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use crate::database::entity::employee;
    use crate::database::postgres_repo::PostgresEmployeeRepository;
    use roster_core::domain::{Employee, EmployeeId, EmployeeStatus, NewEmployee};
    use roster_core::error::RepoError;
    use roster_core::ports::{BaseRepository, EmployeeRepository, ListFilter, ListPage};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};

    fn model(id: uuid::Uuid) -> employee::Model {
        let now = chrono::Utc::now();
        employee::Model {
            id,
            first_name: "Ann".to_owned(),
            last_name: "Lee".to_owned(),
            email: "ann.lee@x.com".to_owned(),
            department: "Eng".to_owned(),
            position: "SWE".to_owned(),
            salary: 100_000.0,
            status: "active".to_owned(),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    fn no_rows() -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }
    }

    #[tokio::test]
    async fn test_find_employee_by_id() {
        let employee_id = uuid::Uuid::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![model(employee_id)]])
            .into_connection();

        let repo = PostgresEmployeeRepository::new(Arc::new(db));

        let result: Option<Employee> = repo
            .find_by_id(&EmployeeId::new(employee_id.to_string()))
            .await
            .unwrap();

        let employee = result.unwrap();
        assert_eq!(employee.id.as_str(), employee_id.to_string());
        assert_eq!(employee.first_name, "Ann");
        assert_eq!(employee.status, EmployeeStatus::Active);
    }

    #[tokio::test]
    async fn test_malformed_id_never_reaches_database() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let repo = PostgresEmployeeRepository::new(Arc::new(db));

        let err = repo
            .find_by_id(&EmployeeId::new("not-a-uuid"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::InvalidId(_)));
    }

    #[tokio::test]
    async fn test_create_returns_assigned_id() {
        let employee_id = uuid::Uuid::new_v4();
        let stored = model(employee_id);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![stored.clone()]])
            .into_connection();
        let repo = PostgresEmployeeRepository::new(Arc::new(db));

        let created = repo
            .create(NewEmployee {
                first_name: stored.first_name.clone(),
                last_name: stored.last_name.clone(),
                email: "Ann.Lee@X.com".to_owned(),
                department: stored.department.clone(),
                position: stored.position.clone(),
                salary: stored.salary,
                status: EmployeeStatus::Active,
                created_at: stored.created_at.into(),
                updated_at: stored.updated_at.into(),
            })
            .await
            .unwrap();

        assert_eq!(created.id.as_str(), employee_id.to_string());
        assert_eq!(created.email, "ann.lee@x.com");
    }

    #[tokio::test]
    async fn test_corrupt_status_is_a_query_error() {
        let employee_id = uuid::Uuid::new_v4();
        let mut row = model(employee_id);
        row.status = "retired".to_owned();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row]])
            .into_connection();
        let repo = PostgresEmployeeRepository::new(Arc::new(db));

        let err = repo
            .find_by_id(&EmployeeId::new(employee_id.to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Query(_)));
    }

    #[tokio::test]
    async fn test_update_missing_row_is_not_found() {
        let employee_id = uuid::Uuid::new_v4();
        let employee = Employee::try_from(model(employee_id)).unwrap();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([no_rows()])
            .into_connection();
        let repo = PostgresEmployeeRepository::new(Arc::new(db));

        let err = repo.update(&employee).await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound));
    }

    #[tokio::test]
    async fn test_delete_missing_row_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([no_rows()])
            .into_connection();
        let repo = PostgresEmployeeRepository::new(Arc::new(db));

        let err = repo
            .delete(&EmployeeId::new(uuid::Uuid::new_v4().to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::NotFound));
    }

    #[tokio::test]
    async fn test_list_builds_filtered_count_and_window_queries() {
        let employee_id = uuid::Uuid::new_v4();
        let count_row = BTreeMap::from([("num_items", Value::BigInt(Some(7)))]);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[count_row]])
                .append_query_results([vec![model(employee_id)]])
                .into_connection(),
        );
        let repo = PostgresEmployeeRepository::new(Arc::clone(&db));

        let filter = ListFilter {
            department: Some("Eng".to_owned()),
            status: Some("active".to_owned()),
            query: Some("O_e".to_owned()),
        };
        let (items, total) = repo
            .list(&filter, ListPage { limit: 5, offset: 10 })
            .await
            .unwrap();

        assert_eq!(total, 7);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id.as_str(), employee_id.to_string());

        drop(repo);
        let log = Arc::try_unwrap(db).ok().unwrap().into_transaction_log();
        let statements: Vec<_> = log.iter().flat_map(|t| t.statements().to_vec()).collect();
        assert_eq!(statements.len(), 2);

        let pattern = Value::from("%o\\_e%");
        for stmt in &statements {
            let values = &stmt.values.as_ref().unwrap().0;
            assert!(values.contains(&Value::from("Eng")), "{}", stmt.sql);
            assert!(values.contains(&Value::from("active")), "{}", stmt.sql);
            assert_eq!(values.iter().filter(|v| **v == pattern).count(), 3);
            assert_eq!(stmt.sql.matches("LOWER(").count(), 3, "{}", stmt.sql);
            assert!(stmt.sql.contains("LIKE"), "{}", stmt.sql);
        }

        let count = &statements[0];
        assert!(count.sql.contains("COUNT(*)"), "{}", count.sql);
        assert!(!count.sql.contains("LIMIT"), "{}", count.sql);

        let window = &statements[1];
        assert!(window.sql.contains("ORDER BY"), "{}", window.sql);
        assert!(window.sql.contains("\"created_at\" DESC"), "{}", window.sql);
        assert!(window.sql.contains("LIMIT"), "{}", window.sql);
        assert!(window.sql.contains("OFFSET"), "{}", window.sql);
        let values = &window.values.as_ref().unwrap().0;
        assert!(values.contains(&Value::from(5u64)));
        assert!(values.contains(&Value::from(10u64)));
    }

    #[tokio::test]
    async fn test_blank_filters_bind_nothing() {
        let count_row = BTreeMap::from([("num_items", Value::BigInt(Some(0)))]);
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[count_row]])
                .append_query_results([Vec::<employee::Model>::new()])
                .into_connection(),
        );
        let repo = PostgresEmployeeRepository::new(Arc::clone(&db));

        let filter = ListFilter {
            department: Some("   ".to_owned()),
            status: None,
            query: Some(String::new()),
        };
        let (items, total) = repo
            .list(&filter, ListPage { limit: 20, offset: 0 })
            .await
            .unwrap();
        assert!(items.is_empty());
        assert_eq!(total, 0);

        drop(repo);
        let log = Arc::try_unwrap(db).ok().unwrap().into_transaction_log();
        let window = &log.last().unwrap().statements()[0];
        assert!(!window.sql.contains("LIKE"), "{}", window.sql);
        let values = &window.values.as_ref().unwrap().0;
        assert!(values.iter().all(|v| !matches!(v, Value::String(_))));
    }
}
