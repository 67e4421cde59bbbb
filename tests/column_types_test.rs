//! Integration tests for keys and columns whose SQLite storage is not text

mod common;

use common::{setup, Attachment, Task};
use uuid::Uuid;

#[tokio::test]
async fn test_uuid_keyed_entity_round_trip() {
    let tem = setup().await;
    let task = Task::new("fetch", 3);

    let id = tem.persist_and_get_id(&task).await.unwrap();
    assert_eq!(id, task.task_uuid);

    let found = tem.find::<Task>(&task.task_uuid).await.unwrap();
    assert_eq!(found, Some(task.clone()));

    // stored as the 16-byte blob sqlx decodes from
    let stored: Vec<u8> = sqlx::query_scalar("SELECT task_uuid FROM task")
        .fetch_one(tem.pool())
        .await
        .unwrap();
    assert_eq!(stored, task.task_uuid.as_bytes().to_vec());

    tem.remove(std::slice::from_ref(&task)).await.unwrap();
    assert_eq!(tem.find::<Task>(&task.task_uuid).await.unwrap(), None);
}

#[tokio::test]
async fn test_uuid_parameters_match_stored_keys() {
    let tem = setup().await;
    let tasks = vec![Task::new("a", 1), Task::new("b", 2), Task::new("c", 3)];
    tem.persist(&tasks).await.unwrap();

    let single = tem
        .query_single(|session| {
            session
                .create_query::<Task>("task_uuid = :uuid")
                .set_parameter("uuid", tasks[1].task_uuid)
        })
        .await
        .unwrap();
    assert_eq!(single, Some(tasks[1].clone()));

    let uuids: Vec<Uuid> = tasks[..2].iter().map(|task| task.task_uuid).collect();
    let deleted = tem
        .execute_update(|session| {
            session
                .create_delete::<Task>("task_uuid IN :uuids")
                .set_parameter("uuids", uuids.clone())
        })
        .await
        .unwrap();
    assert_eq!(deleted, 2);

    let remaining = tem
        .query_list(|session| session.create_query::<Task>("").order_asc("name"))
        .await
        .unwrap();
    assert_eq!(remaining, vec![tasks[2].clone()]);
}

#[tokio::test]
async fn test_merge_uuid_keyed_entity() {
    let tem = setup().await;
    let mut task = Task::new("draft", 1);
    tem.persist(std::slice::from_ref(&task)).await.unwrap();

    task.name = "final".to_string();
    let merged = tem.merge(std::slice::from_ref(&task)).await.unwrap();

    assert_eq!(merged, vec![task.clone()]);
    assert_eq!(tem.find::<Task>(&task.task_uuid).await.unwrap(), Some(task));
}

#[tokio::test]
async fn test_blob_column_round_trip() {
    let tem = setup().await;
    let attachment = Attachment {
        id: 1,
        data: vec![1, 2, 3, 0, 255],
    };

    tem.persist(std::slice::from_ref(&attachment)).await.unwrap();

    let found = tem.find::<Attachment>(&1).await.unwrap();
    assert_eq!(found, Some(attachment.clone()));

    let kind: String = sqlx::query_scalar("SELECT typeof(data) FROM attachment WHERE id = 1")
        .fetch_one(tem.pool())
        .await
        .unwrap();
    assert_eq!(kind, "blob");

    let bytes: &[u8] = &attachment.data;
    let by_content = tem
        .query_single(|session| {
            session
                .create_query::<Attachment>("data = :data")
                .set_parameter("data", bytes)
        })
        .await
        .unwrap();
    assert_eq!(by_content, Some(attachment));
}

#[tokio::test]
async fn test_out_of_range_unsigned_parameter_is_refused() {
    let tem = setup().await;

    let result = test_entity_manager::ParameterValue::try_from(u64::MAX);

    assert!(matches!(
        result,
        Err(test_entity_manager::EntityManagerError::InvalidParameter(_))
    ));
    let in_range = test_entity_manager::ParameterValue::try_from(3u64).unwrap();
    let found = tem
        .query_list(|session| {
            session
                .create_query::<Task>("priority = :priority")
                .set_parameter("priority", in_range)
        })
        .await
        .unwrap();
    assert!(found.is_empty());
}
