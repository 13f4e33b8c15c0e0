//! Contact-form submissions: read-only list with a read/unread flag.

use crate::dto::ContactDto;
use crate::endpoint::NoRequest;
use crate::envelope::{best_effort, emit, ResourceStream};
use crate::filter;
use crate::model::{Ack, Contact};

use super::CrudRepository;

pub type ContactRepository = CrudRepository<ContactDto, Contact, NoRequest>;

impl CrudRepository<ContactDto, Contact, NoRequest> {
    /// All contacts, narrowed client-side to `is_read` when given.
    pub fn list_by_read_state(&self, is_read: Option<bool>) -> ResourceStream<Vec<Contact>> {
        self.list_with(move |all| filter::by_read_state(all, is_read))
    }

    pub fn mark_read(&self, id: i64) -> ResourceStream<Ack> {
        let ctx = self.ctx.clone();
        emit("mark_contact_read", async move {
            let response = ctx.send(ctx.client.build_mark_contact_read(id)).await?;
            ctx.client.parse_ack(response)
        })
    }

    /// Fire-and-forget `mark_read` for when the contact has just been opened.
    pub async fn mark_read_best_effort(&self, id: i64) {
        best_effort("mark_contact_read", self.mark_read(id)).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::endpoint::CONTACTS;
    use crate::envelope::Resource;
    use crate::repository::test_support::{collect, context, ScriptedTransport};

    const CONTACTS_BODY: &str = r#"[
        {"id":1,"name":"Ann","email":"ann@example.com","message":"Hi","isRead":true},
        {"id":2,"name":"Bo","email":"bo@example.com","message":"Hello","isRead":false},
        {"id":3,"name":"Cy","email":"cy@example.com","message":"Hey"}
    ]"#;

    fn contacts(transport: &Arc<ScriptedTransport>) -> ContactRepository {
        let (ctx, _) = context(transport.clone());
        CrudRepository::new(ctx, CONTACTS)
    }

    #[tokio::test]
    async fn unread_filter() {
        let transport = Arc::new(ScriptedTransport::default()).reply(200, CONTACTS_BODY);
        let states = collect(contacts(&transport).list_by_read_state(Some(false))).await;
        let ids: Vec<i64> = states[1].success().unwrap().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[tokio::test]
    async fn no_read_filter_returns_all() {
        let transport = Arc::new(ScriptedTransport::default()).reply(200, CONTACTS_BODY);
        let states = collect(contacts(&transport).list_by_read_state(None)).await;
        assert_eq!(states[1].success().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn mark_read_emits_ack() {
        let transport = Arc::new(ScriptedTransport::default()).reply(204, "");
        let states = collect(contacts(&transport).mark_read(2)).await;
        assert!(matches!(states[1], Resource::Success(Ack::Message { .. })));
        assert_eq!(
            transport.requests()[0].path,
            "http://folio.test/api/contacts/2/read"
        );
    }

    #[tokio::test]
    async fn best_effort_mark_read_swallows_failure() {
        let transport = Arc::new(ScriptedTransport::default()).reply(500, "");
        contacts(&transport).mark_read_best_effort(2).await;
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn delete_contact() {
        let transport = Arc::new(ScriptedTransport::default())
            .reply(404, r#"{"message":"Not Found"}"#);
        let states = collect(contacts(&transport).delete(9)).await;
        assert_eq!(states[1].error_code(), Some(404));
        assert_eq!(states[1].error_message(), Some("Not Found"));
    }
}
