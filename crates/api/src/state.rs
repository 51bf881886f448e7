use mongodb::Database;
use std::sync::Arc;
use teamtask_config::Settings;
use teamtask_services::{
    AuthService,
    dao::{category::CategoryDao, task::TaskDao, team::TeamDao, user::UserDao},
};

use crate::ws::storage::WsStorage;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub settings: Settings,
    pub auth: Arc<AuthService>,
    pub users: Arc<UserDao>,
    pub teams: Arc<TeamDao>,
    pub tasks: Arc<TaskDao>,
    pub categories: Arc<CategoryDao>,
    pub ws_storage: Arc<WsStorage>,
}

impl AppState {
    pub fn new(db: Database, settings: Settings) -> Self {
        let auth = Arc::new(AuthService::new(settings.jwt.clone()));
        let users = Arc::new(UserDao::new(&db));
        let teams = Arc::new(TeamDao::new(&db));
        let tasks = Arc::new(TaskDao::new(&db));
        let categories = Arc::new(CategoryDao::new(&db));
        let ws_storage = Arc::new(WsStorage::new());

        Self {
            db,
            settings,
            auth,
            users,
            teams,
            tasks,
            categories,
            ws_storage,
        }
    }
}
