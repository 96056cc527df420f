mod common;

use chrono::{DateTime, Utc};
use university_library_api::AppError;
use university_library_api::models::{
    RoomCreateInput, RoomUpdateInput, RoomWhereInput, ScheduleCreateInput, WhereUniqueInput,
};
use university_library_api::query::{FieldFilter, FindManyArgs, SortOrder};

fn room_input(id: &str, number: &str, capacity: i32) -> RoomCreateInput {
    RoomCreateInput {
        id: Some(id.to_string()),
        room_number: Some(number.to_string()),
        capacity: Some(capacity),
        ..RoomCreateInput::default()
    }
}

fn timestamp(s: &str) -> DateTime<Utc> {
    s.parse().expect("valid timestamp")
}

#[tokio::test]
async fn test_create_then_get_round_trip() {
    let state = common::setup().await;

    let created = state
        .rooms
        .create_room(RoomCreateInput {
            room_number: Some("101".to_string()),
            capacity: Some(30),
            ..RoomCreateInput::default()
        })
        .await
        .expect("Failed to create room");

    assert!(!created.id.is_empty(), "server should assign an id");
    assert_eq!(created.room_number.as_deref(), Some("101"));
    assert_eq!(created.capacity, Some(30));
    assert!(created.schedules.is_empty());

    let fetched = state.rooms.room(&created.id).await.expect("Failed to get room");
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_create_uses_given_id_and_rejects_duplicates() {
    let state = common::setup().await;

    let room = state.rooms.create_room(room_input("R1", "101", 30)).await.unwrap();
    assert_eq!(room.id, "R1");

    let duplicate = state.rooms.create_room(room_input("R1", "102", 10)).await;
    assert!(matches!(duplicate, Err(AppError::Database(_))));
}

#[tokio::test]
async fn test_create_rejects_out_of_range_capacity() {
    let state = common::setup().await;

    let result = state.rooms.create_room(room_input("R1", "101", 1_000_000_000)).await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));

    let long_number = "9".repeat(1001);
    let result = state
        .rooms
        .create_room(RoomCreateInput {
            room_number: Some(long_number),
            ..RoomCreateInput::default()
        })
        .await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));
}

#[tokio::test]
async fn test_create_links_only_existing_schedules() {
    let state = common::setup().await;
    state
        .schedules
        .create_schedule(ScheduleCreateInput {
            id: Some("S1".to_string()),
            ..ScheduleCreateInput::default()
        })
        .await
        .unwrap();

    let room = state
        .rooms
        .create_room(RoomCreateInput {
            id: Some("R1".to_string()),
            schedules: Some(vec![WhereUniqueInput::new("S1"), WhereUniqueInput::new("missing")]),
            ..RoomCreateInput::default()
        })
        .await
        .unwrap();

    assert_eq!(room.schedules, vec!["S1".to_string()]);
    let schedule = state.schedules.schedule("S1").await.unwrap();
    assert_eq!(schedule.room.as_deref(), Some("R1"));
}

#[tokio::test]
async fn test_delete_then_get_is_not_found() {
    let state = common::setup().await;
    state.rooms.create_room(room_input("R1", "101", 30)).await.unwrap();

    state.rooms.delete_room("R1").await.expect("Failed to delete room");

    assert!(matches!(state.rooms.room("R1").await, Err(AppError::NotFound)));
    assert!(matches!(state.rooms.delete_room("R1").await, Err(AppError::NotFound)));
}

#[tokio::test]
async fn test_list_by_id_returns_single_record() {
    let state = common::setup().await;
    for (id, number) in [("R1", "101"), ("R2", "102"), ("R3", "103")] {
        state.rooms.create_room(room_input(id, number, 20)).await.unwrap();
    }

    let rooms = state.rooms.rooms(FindManyArgs::by_id("R2")).await.unwrap();

    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0].id, "R2");
    assert_eq!(rooms[0].room_number.as_deref(), Some("102"));
}

#[tokio::test]
async fn test_skip_past_end_is_empty() {
    let state = common::setup().await;
    state.rooms.create_room(room_input("R1", "101", 20)).await.unwrap();
    state.rooms.create_room(room_input("R2", "102", 20)).await.unwrap();

    for skip in [2, 3, 100] {
        let args = FindManyArgs::<RoomWhereInput> {
            skip: Some(skip),
            ..FindManyArgs::default()
        };
        let rooms = state.rooms.rooms(args).await.unwrap();
        assert!(rooms.is_empty(), "skip={} should yield nothing", skip);
    }
}

#[tokio::test]
async fn test_sort_then_paginate() {
    let state = common::setup().await;
    for (id, capacity) in [("R1", 10), ("R2", 40), ("R3", 25), ("R4", 5)] {
        state.rooms.create_room(room_input(id, id, capacity)).await.unwrap();
    }

    let args = FindManyArgs::<RoomWhereInput> {
        sort_by: Some(SortOrder::desc("capacity")),
        skip: Some(1),
        take: Some(2),
        ..FindManyArgs::default()
    };
    let ids: Vec<String> = state.rooms.rooms(args).await.unwrap().into_iter().map(|r| r.id).collect();

    assert_eq!(ids, vec!["R3".to_string(), "R1".to_string()]);
}

#[tokio::test]
async fn test_filters_are_anded_and_null_checks_work() {
    let state = common::setup().await;
    state.rooms.create_room(room_input("R1", "101", 30)).await.unwrap();
    state.rooms.create_room(room_input("R2", "101", 20)).await.unwrap();
    state
        .rooms
        .create_room(RoomCreateInput {
            id: Some("R3".to_string()),
            room_number: Some("101".to_string()),
            ..RoomCreateInput::default()
        })
        .await
        .unwrap();

    let mut args = FindManyArgs::<RoomWhereInput>::default();
    args.r#where.room_number = Some(FieldFilter::Equals("101".to_string()));
    args.r#where.capacity = Some(FieldFilter::Equals(20));
    let rooms = state.rooms.rooms(args).await.unwrap();
    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0].id, "R2");

    let mut args = FindManyArgs::<RoomWhereInput>::default();
    args.r#where.capacity = Some(FieldFilter::IsNull);
    let rooms = state.rooms.rooms(args).await.unwrap();
    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0].id, "R3");
}

#[tokio::test]
async fn test_filter_by_schedule_ids() {
    let state = common::setup().await;
    state.rooms.create_room(room_input("R1", "101", 30)).await.unwrap();
    state.rooms.create_room(room_input("R2", "102", 30)).await.unwrap();
    for (schedule, room) in [("S1", "R1"), ("S2", "R2")] {
        state
            .schedules
            .create_schedule(ScheduleCreateInput {
                id: Some(schedule.to_string()),
                room: Some(WhereUniqueInput::new(room)),
                ..ScheduleCreateInput::default()
            })
            .await
            .unwrap();
    }

    let mut args = FindManyArgs::<RoomWhereInput>::default();
    args.r#where.schedules = Some(vec!["S2".to_string(), "S9".to_string()]);
    let rooms = state.rooms.rooms(args).await.unwrap();

    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0].id, "R2");
    assert_eq!(rooms[0].schedules, vec!["S2".to_string()]);
}

#[tokio::test]
async fn test_meta_counts_where_only() {
    let state = common::setup().await;
    for (id, capacity) in [("R1", 10), ("R2", 10), ("R3", 25)] {
        state.rooms.create_room(room_input(id, id, capacity)).await.unwrap();
    }

    let mut args = FindManyArgs::<RoomWhereInput> {
        skip: Some(5),
        take: Some(1),
        ..FindManyArgs::default()
    };
    args.r#where.capacity = Some(FieldFilter::Equals(10));
    let meta = state.rooms.rooms_meta(args).await.unwrap();
    assert_eq!(meta.count, 2);

    let meta = state.rooms.rooms_meta(FindManyArgs::default()).await.unwrap();
    assert_eq!(meta.count, 3);
}

#[tokio::test]
async fn test_update_replaces_fields_and_keeps_timestamps() {
    let state = common::setup().await;
    let created_at = timestamp("2024-01-01T08:00:00Z");
    let updated_at = timestamp("2024-02-01T08:00:00Z");
    state
        .rooms
        .create_room(RoomCreateInput {
            id: Some("R1".to_string()),
            created_at: Some(created_at),
            updated_at: Some(updated_at),
            room_number: Some("101".to_string()),
            capacity: Some(30),
            ..RoomCreateInput::default()
        })
        .await
        .unwrap();

    state
        .rooms
        .update_room(
            "R1",
            RoomUpdateInput {
                room_number: Some("201".to_string()),
                ..RoomUpdateInput::default()
            },
        )
        .await
        .expect("Failed to update room");

    let room = state.rooms.room("R1").await.unwrap();
    assert_eq!(room.room_number.as_deref(), Some("201"));
    assert_eq!(room.capacity, None, "unset fields are cleared");
    assert_eq!(room.created_at, created_at);
    assert_eq!(room.updated_at, updated_at);

    let later = timestamp("2024-03-01T08:00:00Z");
    state
        .rooms
        .update_room(
            "R1",
            RoomUpdateInput {
                updated_at: Some(later),
                ..RoomUpdateInput::default()
            },
        )
        .await
        .unwrap();
    let room = state.rooms.room("R1").await.unwrap();
    assert_eq!(room.updated_at, later);
    assert_eq!(room.created_at, created_at);
}

#[tokio::test]
async fn test_update_missing_room_is_not_found() {
    let state = common::setup().await;

    let result = state.rooms.update_room("nope", RoomUpdateInput::default()).await;

    assert!(matches!(result, Err(AppError::NotFound)));
}

#[tokio::test]
async fn test_unbounded_list_of_many_rooms() {
    let state = common::setup().await;
    sqlx::query(
        r#"
        WITH RECURSIVE seq(n) AS (SELECT 1 UNION ALL SELECT n + 1 FROM seq WHERE n < 40000)
        INSERT INTO rooms (id, created_at, updated_at, room_number, capacity)
        SELECT printf('R%05d', n), '2024-01-01T00:00:00+00:00', '2024-01-01T00:00:00+00:00', NULL, n
        FROM seq
        "#,
    )
    .execute(&state.db)
    .await
    .expect("Failed to seed rooms");
    state
        .schedules
        .create_schedule(ScheduleCreateInput {
            id: Some("S1".to_string()),
            room: Some(WhereUniqueInput::new("R39999")),
            ..ScheduleCreateInput::default()
        })
        .await
        .unwrap();

    let rooms = state.rooms.rooms(FindManyArgs::default()).await.expect("Failed to list rooms");

    assert_eq!(rooms.len(), 40000);
    let linked = rooms.iter().find(|r| r.id == "R39999").unwrap();
    assert_eq!(linked.schedules, vec!["S1".to_string()]);
    assert_eq!(rooms.iter().filter(|r| !r.schedules.is_empty()).count(), 1);
}

#[tokio::test]
async fn test_schedule_filter_matches_ids_containing_commas() {
    let state = common::setup().await;
    state.rooms.create_room(room_input("R1", "101", 30)).await.unwrap();
    state.rooms.create_room(room_input("R2", "102", 30)).await.unwrap();
    for (schedule, room) in [("a,b", "R1"), ("a", "R2")] {
        state
            .schedules
            .create_schedule(ScheduleCreateInput {
                id: Some(schedule.to_string()),
                room: Some(WhereUniqueInput::new(room)),
                ..ScheduleCreateInput::default()
            })
            .await
            .unwrap();
    }

    let params = vec![("where.schedules".to_string(), "a,b".to_string())];
    let args = FindManyArgs::<RoomWhereInput>::from_query(&params).unwrap();
    let rooms = state.rooms.rooms(args).await.unwrap();

    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0].id, "R1");
}
