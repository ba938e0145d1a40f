mod inmemory;
mod postgres;

pub use inmemory::InMemoryUserRepo;
use alarm_notifier_domain::{User, ID};
pub use postgres::PostgresUserRepo;

#[async_trait::async_trait]
pub trait IUserRepo: Send + Sync {
    async fn insert(&self, user: &User) -> anyhow::Result<()>;
    async fn save(&self, user: &User) -> anyhow::Result<()>;
    async fn delete(&self, user_id: &ID) -> Option<User>;
    async fn find(&self, user_id: &ID) -> Option<User>;
    async fn find_by_username(&self, username: &str) -> Option<User>;
}

#[cfg(test)]
mod tests {
    use crate::AlarmContext;
    use alarm_notifier_domain::User;

    #[tokio::test]
    async fn test_user_queries() {
        let ctx = AlarmContext::create_inmemory();

        let mut user = User::new("alice".into());
        user.email = Some("alice@example.com".into());
        ctx.repos.users.insert(&user).await.expect("To insert user");

        let found = ctx.repos.users.find(&user.id).await.expect("To find user");
        assert_eq!(found, user);
        assert_eq!(
            ctx.repos.users.find_by_username("alice").await.map(|u| u.id),
            Some(user.id)
        );
        assert!(ctx.repos.users.find_by_username("bob").await.is_none());

        user.phone_number = Some("+4799999999".into());
        ctx.repos.users.save(&user).await.expect("To save user");
        let found = ctx.repos.users.find(&user.id).await.expect("To find user");
        assert_eq!(found.phone_number.as_deref(), Some("+4799999999"));

        assert_eq!(ctx.repos.users.delete(&user.id).await, Some(user.clone()));
        assert!(ctx.repos.users.find(&user.id).await.is_none());
    }
}
