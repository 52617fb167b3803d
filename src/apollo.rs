mod apollo_cookie;
mod calendar;
mod client;
mod cookies;
mod database_ext;

pub use self::{
    apollo_cookie::ApolloCookie,
    calendar::CalendarDay,
    client::{ApolloClient, ApolloClientError, PunchResult, PunchStatus},
    cookies::{CookieEntry, StoredCookies},
};
