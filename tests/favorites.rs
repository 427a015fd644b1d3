use cinefetch::database::FavoritesStore;
use cinefetch::models::FavoriteRecord;
use tempfile::TempDir;

fn record(id: &str, note: &str) -> FavoriteRecord {
    FavoriteRecord {
        id: id.to_string(),
        title: format!("Movie {}", id),
        description: format!("Description {}", id),
        poster_url: Some(format!("http://example.com/{}.jpg", id)),
        user_note: note.to_string(),
    }
}

async fn open_store(dir: &TempDir) -> FavoritesStore {
    let url = format!("sqlite:{}/favorites.db", dir.path().display());
    FavoritesStore::open(&url, 5)
        .await
        .expect("failed to open store")
}

#[tokio::test]
async fn fresh_store_lists_empty() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;
    assert!(store.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn upsert_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    let fav = record("123", "my note");
    store.upsert(&fav).await.unwrap();
    store.upsert(&fav).await.unwrap();

    let favorites = store.list().await.unwrap();
    assert_eq!(favorites, vec![fav]);
}

#[tokio::test]
async fn upsert_overwrites_existing_record() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    store.upsert(&record("1", "a")).await.unwrap();
    store.upsert(&record("1", "b")).await.unwrap();

    let found = store.get("1").await.unwrap().expect("record missing");
    assert_eq!(found.user_note, "b");
    assert_eq!(store.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn remove_then_list_keeps_survivor() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    store.upsert(&record("1", "first")).await.unwrap();
    store.upsert(&record("2", "second")).await.unwrap();
    store.remove("1").await.unwrap();

    let favorites = store.list().await.unwrap();
    assert_eq!(favorites.len(), 1);
    assert_eq!(favorites[0].id, "2");
}

#[tokio::test]
async fn remove_of_absent_id_is_a_noop() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    store.remove("missing").await.unwrap();
    assert!(store.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn get_distinguishes_present_and_absent() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    let fav = record("42", "note");
    store.upsert(&fav).await.unwrap();

    assert_eq!(store.get("42").await.unwrap(), Some(fav));
    assert_eq!(store.get("43").await.unwrap(), None);
}

#[tokio::test]
async fn favorites_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let fav = record("9", "kept");

    {
        let store = open_store(&dir).await;
        store.upsert(&fav).await.unwrap();
        store.pool.close().await;
    }

    let store = open_store(&dir).await;
    assert_eq!(store.list().await.unwrap(), vec![fav]);
}
