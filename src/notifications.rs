mod api_ext;
mod database_ext;
mod job_execution_message;
mod telegram_client;
mod telegram_token;

pub use self::{
    api_ext::NotificationsApi, telegram_client::TelegramClient, telegram_token::TelegramToken,
};
