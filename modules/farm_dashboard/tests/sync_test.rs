mod common;

use chrono::NaiveDate;
use common::{png, synchronizer, user, FakeBackend, Op};
use farm_dashboard::contract::model::{
    AssetKind, Confirmation, DeleteOutcome, FarmDraft, NotificationPreferences,
};
use farm_dashboard::domain::error::DomainError;

fn draft(name: &str, area: &str, location: &str) -> FarmDraft {
    FarmDraft {
        name: name.to_string(),
        area: area.to_string(),
        location: location.to_string(),
    }
}

#[tokio::test]
async fn created_farms_show_up_in_listing() {
    let backend = FakeBackend::new();
    let sync = synchronizer(&backend);
    let owner = user(Some("ana@farm.io"));

    for (name, area, location) in [
        ("Fazenda Boa Vista", "12.5", "Ilhéus, BA"),
        ("Sítio Santa Rita", "0", "Uruçuca, BA"),
        ("Roça Nova", "340", ""),
    ] {
        let created = sync
            .create_farm(owner.id, &draft(name, area, location))
            .await
            .unwrap();
        let listed = sync.list_farms(owner.id).await.unwrap();
        let found = listed
            .iter()
            .find(|f| f.id == created.id)
            .expect("created farm is listed");
        assert_eq!(found.name, name);
        assert_eq!(found.area, area.parse::<f64>().unwrap());
        assert_eq!(found.location, location);
        assert_eq!(found.user_id, owner.id);
        assert!(found.created_at <= found.updated_at);
    }
}

#[tokio::test]
async fn listing_is_newest_first_and_owner_scoped() {
    let backend = FakeBackend::new();
    let sync = synchronizer(&backend);
    let ana = user(Some("ana@farm.io"));
    let bia = user(Some("bia@farm.io"));

    let first = sync.create_farm(ana.id, &draft("A", "1", "x")).await.unwrap();
    sync.create_farm(bia.id, &draft("B", "1", "x")).await.unwrap();
    let second = sync.create_farm(ana.id, &draft("C", "1", "x")).await.unwrap();

    let listed = sync.list_farms(ana.id).await.unwrap();
    let ids: Vec<_> = listed.iter().map(|f| f.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
}

#[tokio::test]
async fn non_numeric_area_never_reaches_backend() {
    let backend = FakeBackend::new();
    let sync = synchronizer(&backend);
    let owner = user(Some("ana@farm.io"));

    for area in ["abc", "", "12,5", "1e", "ten", "-1"] {
        let err = sync
            .create_farm(owner.id, &draft("Farm", area, "x"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }), "{:?}", err);
    }
    assert_eq!(backend.calls(Op::InsertFarm), 0);
    assert_eq!(backend.farm_count(), 0);
}

#[tokio::test]
async fn rejected_insert_is_a_persist_error() {
    let backend = FakeBackend::new();
    backend.fail(Op::InsertFarm);
    let sync = synchronizer(&backend);

    let err = sync
        .create_farm(user(None).id, &draft("Farm", "3", "x"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Persist { .. }));
}

#[tokio::test]
async fn fetch_or_create_is_idempotent_for_new_user() {
    let backend = FakeBackend::new();
    let sync = synchronizer(&backend);
    let owner = user(Some("joana.silva@cacau.com.br"));

    let first = sync.fetch_or_create_profile(&owner).await.unwrap();
    let second = sync.fetch_or_create_profile(&owner).await.unwrap();

    assert_eq!(first.full_name, "joana.silva");
    assert_eq!(first.notification_preferences, NotificationPreferences::default());
    assert_eq!(first, second);
    assert_eq!(backend.calls(Op::InsertProfile), 1);
    assert_eq!(backend.calls(Op::FindProfile), 2);
}

#[tokio::test]
async fn default_name_falls_back_without_email() {
    let backend = FakeBackend::new();
    let sync = synchronizer(&backend);

    let profile = sync.fetch_or_create_profile(&user(None)).await.unwrap();
    assert_eq!(profile.full_name, "User");

    let profile = sync
        .fetch_or_create_profile(&user(Some("@no-local-part.io")))
        .await
        .unwrap();
    assert_eq!(profile.full_name, "User");
}

#[tokio::test]
async fn lookup_failure_is_fetch_error_and_creates_nothing() {
    let backend = FakeBackend::new();
    backend.fail(Op::FindProfile);
    let sync = synchronizer(&backend);

    let err = sync
        .fetch_or_create_profile(&user(Some("ana@farm.io")))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Fetch { .. }));
    assert_eq!(backend.calls(Op::InsertProfile), 0);
}

#[tokio::test]
async fn saved_profile_round_trips_with_advanced_timestamp() {
    let backend = FakeBackend::new();
    let sync = synchronizer(&backend);
    let owner = user(Some("ana@farm.io"));

    let original = sync.fetch_or_create_profile(&owner).await.unwrap();
    let mut fields = original.fields();
    fields.full_name = "Ana Souza".into();
    fields.display_name = Some("Ana".into());
    fields.phone = Some("+55 73 99999-0000".into());
    fields.birth_date = NaiveDate::from_ymd_opt(1988, 3, 14);
    fields.professional_title = Some("Agronomist".into());
    fields.bio = Some("Cacao under agroforestry.".into());
    fields.notification_preferences = NotificationPreferences {
        email: true,
        push: false,
    };

    sync.save_profile(owner.id, fields.clone()).await.unwrap();
    let fetched = sync.fetch_or_create_profile(&owner).await.unwrap();

    assert_eq!(fetched.fields(), fields);
    assert_eq!(fetched.id, original.id);
    assert!(fetched.updated_at > original.updated_at);
    assert_eq!(backend.calls(Op::InsertProfile), 1);
}

#[tokio::test]
async fn save_requires_full_name() {
    let backend = FakeBackend::new();
    let sync = synchronizer(&backend);

    let err = sync
        .save_profile(user(None).id, Default::default())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation { .. }));
    assert_eq!(backend.calls(Op::UpsertProfile), 0);
}

#[tokio::test]
async fn delete_needs_confirmation() {
    let backend = FakeBackend::new();
    let sync = synchronizer(&backend);
    let owner = user(None);
    let farm = sync.create_farm(owner.id, &draft("A", "1", "x")).await.unwrap();

    let outcome = sync
        .delete_farm(farm.id, Confirmation::Declined)
        .await
        .unwrap();
    assert_eq!(outcome, DeleteOutcome::Cancelled);
    assert_eq!(backend.calls(Op::DeleteFarm), 0);
    assert_eq!(sync.list_farms(owner.id).await.unwrap().len(), 1);

    let outcome = sync
        .delete_farm(farm.id, Confirmation::Confirmed)
        .await
        .unwrap();
    assert_eq!(outcome, DeleteOutcome::Deleted);
    assert!(sync.list_farms(owner.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn upload_stores_object_and_patches_profile() {
    let backend = FakeBackend::new();
    let sync = synchronizer(&backend);
    let owner = user(Some("ana@farm.io"));
    sync.fetch_or_create_profile(&owner).await.unwrap();

    let url = sync
        .upload_asset(owner.id, &png("me.png"), AssetKind::Avatar)
        .await
        .unwrap();

    let paths = backend.object_paths();
    assert_eq!(paths.len(), 1);
    assert!(paths[0].starts_with(&format!("{}/avatar-", owner.id)));
    assert!(url.ends_with(&paths[0]));
    assert_eq!(
        backend.profile_of(owner.id).unwrap().avatar_url.as_deref(),
        Some(url.as_str())
    );
}

#[tokio::test]
async fn storage_failure_is_upload_error_without_patch() {
    let backend = FakeBackend::new();
    backend.fail(Op::Upload);
    let sync = synchronizer(&backend);

    let err = sync
        .upload_asset(user(None).id, &png("c.png"), AssetKind::Cover)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Upload { .. }));
    assert_eq!(backend.calls(Op::PatchProfile), 0);
}

#[tokio::test]
async fn patch_failure_keeps_the_orphaned_path() {
    let backend = FakeBackend::new();
    backend.fail(Op::PatchProfile);
    let sync = synchronizer(&backend);

    let err = sync
        .upload_asset(user(None).id, &png("c.png"), AssetKind::Cover)
        .await
        .unwrap_err();
    match err {
        DomainError::AssetPatch { path, .. } => {
            assert_eq!(backend.object_paths(), vec![path]);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn empty_file_is_rejected_locally() {
    let backend = FakeBackend::new();
    let sync = synchronizer(&backend);
    let mut file = png("x.png");
    file.bytes.clear();

    let err = sync
        .upload_asset(user(None).id, &file, AssetKind::Avatar)
        .await
        .unwrap_err();
    assert!(err.is_local());
    assert_eq!(backend.calls(Op::Upload), 0);
}
