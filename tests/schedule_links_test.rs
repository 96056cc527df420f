mod common;

use university_library_api::AppError;
use university_library_api::models::{
    RoomCreateInput, RoomUpdateInput, ScheduleCreateInput, ScheduleWhereInput, StudentCreateInput,
    TeacherCreateInput, TeacherUpdateInput, WhereUniqueInput,
};
use university_library_api::query::{FindManyArgs, SortOrder};
use university_library_api::state::AppState;

fn ids(list: &[&str]) -> Vec<WhereUniqueInput> {
    list.iter().map(|id| WhereUniqueInput::new(*id)).collect()
}

fn strings(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

async fn seed(state: &AppState, schedules: &[&str]) {
    state
        .rooms
        .create_room(RoomCreateInput {
            id: Some("R1".to_string()),
            ..RoomCreateInput::default()
        })
        .await
        .unwrap();
    for id in schedules {
        state
            .schedules
            .create_schedule(ScheduleCreateInput {
                id: Some(id.to_string()),
                ..ScheduleCreateInput::default()
            })
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn test_connect_only_resolvable_schedules() {
    let state = common::setup().await;
    seed(&state, &["S1"]).await;

    state
        .rooms
        .connect_schedules("R1", &ids(&["S1", "S2"]))
        .await
        .expect("one resolvable schedule is enough");

    assert_eq!(state.rooms.room("R1").await.unwrap().schedules, strings(&["S1"]));
}

#[tokio::test]
async fn test_connect_is_a_union() {
    let state = common::setup().await;
    seed(&state, &["S1", "S2", "S3"]).await;
    state.rooms.connect_schedules("R1", &ids(&["S1", "S2"])).await.unwrap();

    state.rooms.connect_schedules("R1", &ids(&["S2", "S3", "S3"])).await.unwrap();

    assert_eq!(
        state.rooms.room("R1").await.unwrap().schedules,
        strings(&["S1", "S2", "S3"])
    );
}

#[tokio::test]
async fn test_connect_without_resolvable_schedules_is_not_found() {
    let state = common::setup().await;
    seed(&state, &["S1"]).await;

    let result = state.rooms.connect_schedules("R1", &ids(&["S8", "S9"])).await;
    assert!(matches!(result, Err(AppError::NotFound)));

    let result = state.rooms.connect_schedules("R1", &[]).await;
    assert!(matches!(result, Err(AppError::NotFound)));

    assert!(state.rooms.room("R1").await.unwrap().schedules.is_empty());
}

#[tokio::test]
async fn test_relationship_ops_need_an_owner() {
    let state = common::setup().await;
    seed(&state, &["S1"]).await;

    let connect = state.rooms.connect_schedules("R9", &ids(&["S1"])).await;
    let disconnect = state.rooms.disconnect_schedules("R9", &ids(&["S1"])).await;
    let replace = state.rooms.update_schedules("R9", &ids(&["S1"])).await;

    assert!(matches!(connect, Err(AppError::NotFound)));
    assert!(matches!(disconnect, Err(AppError::NotFound)));
    assert!(matches!(replace, Err(AppError::NotFound)));
}

#[tokio::test]
async fn test_disconnect_removes_the_intersection() {
    let state = common::setup().await;
    seed(&state, &["S1", "S2", "S3", "S4"]).await;
    state.rooms.connect_schedules("R1", &ids(&["S1", "S2", "S3"])).await.unwrap();

    state
        .rooms
        .disconnect_schedules("R1", &ids(&["S2", "S4", "S9"]))
        .await
        .expect("unlinked and unknown ids are ignored");

    assert_eq!(state.rooms.room("R1").await.unwrap().schedules, strings(&["S1", "S3"]));
    assert_eq!(state.schedules.schedule("S2").await.unwrap().room, None);
}

#[tokio::test]
async fn test_replace_links_exactly_the_resolved_subset() {
    let state = common::setup().await;
    seed(&state, &["S1", "S2", "S3"]).await;
    state.rooms.connect_schedules("R1", &ids(&["S1", "S2"])).await.unwrap();

    state.rooms.update_schedules("R1", &ids(&["S2", "S3", "S9"])).await.unwrap();

    assert_eq!(state.rooms.room("R1").await.unwrap().schedules, strings(&["S2", "S3"]));
    assert_eq!(state.schedules.schedule("S1").await.unwrap().room, None);
}

#[tokio::test]
async fn test_replace_with_nothing_resolvable_is_not_found() {
    let state = common::setup().await;
    seed(&state, &["S1"]).await;
    state.rooms.connect_schedules("R1", &ids(&["S1"])).await.unwrap();

    let empty = state.rooms.update_schedules("R1", &[]).await;
    let unresolved = state.rooms.update_schedules("R1", &ids(&["S9"])).await;

    assert!(matches!(empty, Err(AppError::NotFound)));
    assert!(matches!(unresolved, Err(AppError::NotFound)));
    assert_eq!(state.rooms.room("R1").await.unwrap().schedules, strings(&["S1"]));
}

#[tokio::test]
async fn test_find_schedules_is_scoped_and_paged() {
    let state = common::setup().await;
    seed(&state, &["S1", "S2", "S3", "S4"]).await;
    state.rooms.connect_schedules("R1", &ids(&["S1", "S2", "S3"])).await.unwrap();

    let args = FindManyArgs::<ScheduleWhereInput> {
        sort_by: Some(SortOrder::desc("id")),
        take: Some(2),
        ..FindManyArgs::default()
    };
    let found: Vec<String> = state
        .rooms
        .find_schedules("R1", args)
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(found, strings(&["S3", "S2"]));

    let none = state.rooms.find_schedules("R9", FindManyArgs::default()).await.unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_connect_moves_schedule_between_teachers() {
    let state = common::setup().await;
    seed(&state, &["S1"]).await;
    for id in ["T1", "T2"] {
        state
            .teachers
            .create_teacher(TeacherCreateInput {
                id: Some(id.to_string()),
                ..TeacherCreateInput::default()
            })
            .await
            .unwrap();
    }

    state.teachers.connect_schedules("T1", &ids(&["S1"])).await.unwrap();
    state.teachers.connect_schedules("T2", &ids(&["S1"])).await.unwrap();

    assert!(state.teachers.teacher("T1").await.unwrap().schedules.is_empty());
    assert_eq!(state.teachers.teacher("T2").await.unwrap().schedules, strings(&["S1"]));
    assert_eq!(state.schedules.schedule("S1").await.unwrap().teacher.as_deref(), Some("T2"));
}

#[tokio::test]
async fn test_teacher_update_replaces_schedules_without_requiring_any() {
    let state = common::setup().await;
    seed(&state, &["S1", "S2"]).await;
    state
        .teachers
        .create_teacher(TeacherCreateInput {
            id: Some("T1".to_string()),
            name: Some("Ada".to_string()),
            schedules: Some(ids(&["S1", "S2"])),
            ..TeacherCreateInput::default()
        })
        .await
        .unwrap();

    state
        .teachers
        .update_teacher(
            "T1",
            TeacherUpdateInput {
                name: Some("Ada L.".to_string()),
                schedules: Some(Vec::new()),
                ..TeacherUpdateInput::default()
            },
        )
        .await
        .unwrap();

    let teacher = state.teachers.teacher("T1").await.unwrap();
    assert_eq!(teacher.name.as_deref(), Some("Ada L."));
    assert!(teacher.schedules.is_empty());
}

#[tokio::test]
async fn test_student_links_round_trip() {
    let state = common::setup().await;
    seed(&state, &["S1", "S2"]).await;
    state
        .students
        .create_student(StudentCreateInput {
            id: Some("ST1".to_string()),
            ..StudentCreateInput::default()
        })
        .await
        .unwrap();

    state.students.connect_schedules("ST1", &ids(&["S1", "S2"])).await.unwrap();
    state.students.disconnect_schedules("ST1", &ids(&["S1"])).await.unwrap();

    let student = state.students.student("ST1").await.unwrap();
    assert_eq!(student.schedules, strings(&["S2"]));
    let found = state.students.find_schedules("ST1", FindManyArgs::default()).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].student.as_deref(), Some("ST1"));
}

#[tokio::test]
async fn test_connect_with_many_requested_ids() {
    let state = common::setup().await;
    seed(&state, &["S1", "S2"]).await;
    let mut requested: Vec<WhereUniqueInput> = (0..1500)
        .map(|n| WhereUniqueInput::new(format!("missing-{}", n)))
        .collect();
    requested.insert(700, WhereUniqueInput::new("S2"));
    requested.push(WhereUniqueInput::new("S1"));

    state.rooms.connect_schedules("R1", &requested).await.unwrap();

    assert_eq!(state.rooms.room("R1").await.unwrap().schedules, strings(&["S1", "S2"]));
}

#[tokio::test]
async fn test_room_update_takes_plain_schedule_ids() {
    let state = common::setup().await;
    seed(&state, &["S1", "S2", "S3"]).await;
    state.rooms.connect_schedules("R1", &ids(&["S1"])).await.unwrap();

    state
        .rooms
        .update_room(
            "R1",
            RoomUpdateInput {
                schedules: Some(strings(&["S2", "S3", "S9"])),
                ..RoomUpdateInput::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(state.rooms.room("R1").await.unwrap().schedules, strings(&["S2", "S3"]));
}
