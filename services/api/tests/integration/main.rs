mod helpers;

mod entry_pass_test;
mod event_test;
mod payment_test;
mod rating_test;
mod router_test;
mod ticket_test;
mod user_test;
