use std::collections::HashSet;

use mockall::mock;

use super::{
    IngredientReader, IngredientWriter, MembershipReader, MembershipWriter, RecipeReader,
    RecipeWriter, RepositoryResult, SubscriptionReader, SubscriptionWriter, TagReader, TagWriter,
    UserReader, UserWriter,
};
use crate::domain::{
    ingredient::{Ingredient, IngredientListQuery, NewIngredient},
    membership::{Membership, MembershipKind, NewMembership},
    recipe::{NewRecipe, Recipe, RecipeListQuery, UpdateRecipe},
    shopping_list::CartIngredient,
    subscription::{NewSubscription, Subscription, SubscriptionListQuery},
    tag::{NewTag, Tag, TagListQuery, UpdateTag},
    user::{NewUser, UpdateUser, User, UserListQuery},
};

mock! {
    pub UserReader {}

    impl UserReader for UserReader {
        fn get_user_by_id(&self, id: i32) -> RepositoryResult<Option<User>>;
        fn get_user_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;
        fn list_users(&self, query: UserListQuery) -> RepositoryResult<(usize, Vec<User>)>;
    }
}

mock! {
    pub UserWriter {}

    impl UserWriter for UserWriter {
        fn create_user(&self, new_user: &NewUser) -> RepositoryResult<User>;
        fn update_user(&self, user_id: i32, updates: &UpdateUser) -> RepositoryResult<User>;
    }
}

mock! {
    pub TagReader {}

    impl TagReader for TagReader {
        fn get_tag_by_id(&self, id: i32) -> RepositoryResult<Option<Tag>>;
        fn list_tags(&self, query: TagListQuery) -> RepositoryResult<Vec<Tag>>;
    }
}

mock! {
    pub TagWriter {}

    impl TagWriter for TagWriter {
        fn create_tag(&self, new_tag: &NewTag) -> RepositoryResult<Tag>;
        fn update_tag(&self, tag_id: i32, updates: &UpdateTag) -> RepositoryResult<Tag>;
        fn delete_tag(&self, tag_id: i32) -> RepositoryResult<()>;
    }
}

mock! {
    pub IngredientReader {}

    impl IngredientReader for IngredientReader {
        fn get_ingredient_by_id(&self, id: i32) -> RepositoryResult<Option<Ingredient>>;
        fn get_ingredients_by_ids(&self, ids: &[i32]) -> RepositoryResult<Vec<Ingredient>>;
        fn list_ingredients(&self, query: IngredientListQuery) -> RepositoryResult<Vec<Ingredient>>;
    }
}

mock! {
    pub IngredientWriter {}

    impl IngredientWriter for IngredientWriter {
        fn upsert_ingredients(&self, new_ingredients: &[NewIngredient]) -> RepositoryResult<usize>;
    }
}

mock! {
    pub RecipeReader {}

    impl RecipeReader for RecipeReader {
        fn get_recipe_by_id(&self, id: i32) -> RepositoryResult<Option<Recipe>>;
        fn list_recipes(&self, query: RecipeListQuery) -> RepositoryResult<(usize, Vec<Recipe>)>;
    }
}

mock! {
    pub RecipeWriter {}

    impl RecipeWriter for RecipeWriter {
        fn create_recipe(&self, new_recipe: &NewRecipe) -> RepositoryResult<Recipe>;
        fn update_recipe(&self, recipe_id: i32, updates: &UpdateRecipe) -> RepositoryResult<Recipe>;
        fn delete_recipe(&self, recipe_id: i32) -> RepositoryResult<()>;
    }
}

mock! {
    pub MembershipReader {}

    impl MembershipReader for MembershipReader {
        fn list_member_recipe_ids(
            &self,
            user_id: i32,
            kind: MembershipKind,
            recipe_ids: &[i32],
        ) -> RepositoryResult<HashSet<i32>>;
        fn list_cart_ingredients(&self, user_id: i32) -> RepositoryResult<Vec<CartIngredient>>;
    }
}

mock! {
    pub MembershipWriter {}

    impl MembershipWriter for MembershipWriter {
        fn create_membership(&self, new_membership: &NewMembership) -> RepositoryResult<Membership>;
        fn delete_membership(
            &self,
            user_id: i32,
            recipe_id: i32,
            kind: MembershipKind,
        ) -> RepositoryResult<()>;
    }
}

mock! {
    pub SubscriptionReader {}

    impl SubscriptionReader for SubscriptionReader {
        fn list_subscribed_author_ids(
            &self,
            user_id: i32,
            author_ids: &[i32],
        ) -> RepositoryResult<HashSet<i32>>;
        fn list_subscriptions(
            &self,
            query: SubscriptionListQuery,
        ) -> RepositoryResult<(usize, Vec<User>)>;
    }
}

mock! {
    pub SubscriptionWriter {}

    impl SubscriptionWriter for SubscriptionWriter {
        fn create_subscription(
            &self,
            new_subscription: &NewSubscription,
        ) -> RepositoryResult<Subscription>;
        fn delete_subscription(&self, user_id: i32, author_id: i32) -> RepositoryResult<()>;
    }
}

/// Repository combining every mock so services with several trait bounds can be tested.
#[derive(Default)]
pub struct FakeRepo {
    pub user_reader: MockUserReader,
    pub user_writer: MockUserWriter,
    pub tag_reader: MockTagReader,
    pub tag_writer: MockTagWriter,
    pub ingredient_reader: MockIngredientReader,
    pub ingredient_writer: MockIngredientWriter,
    pub recipe_reader: MockRecipeReader,
    pub recipe_writer: MockRecipeWriter,
    pub membership_reader: MockMembershipReader,
    pub membership_writer: MockMembershipWriter,
    pub subscription_reader: MockSubscriptionReader,
    pub subscription_writer: MockSubscriptionWriter,
}

impl FakeRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserReader for FakeRepo {
    fn get_user_by_id(&self, id: i32) -> RepositoryResult<Option<User>> {
        self.user_reader.get_user_by_id(id)
    }

    fn get_user_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        self.user_reader.get_user_by_email(email)
    }

    fn list_users(&self, query: UserListQuery) -> RepositoryResult<(usize, Vec<User>)> {
        self.user_reader.list_users(query)
    }
}

impl UserWriter for FakeRepo {
    fn create_user(&self, new_user: &NewUser) -> RepositoryResult<User> {
        self.user_writer.create_user(new_user)
    }

    fn update_user(&self, user_id: i32, updates: &UpdateUser) -> RepositoryResult<User> {
        self.user_writer.update_user(user_id, updates)
    }
}

impl TagReader for FakeRepo {
    fn get_tag_by_id(&self, id: i32) -> RepositoryResult<Option<Tag>> {
        self.tag_reader.get_tag_by_id(id)
    }

    fn list_tags(&self, query: TagListQuery) -> RepositoryResult<Vec<Tag>> {
        self.tag_reader.list_tags(query)
    }
}

impl TagWriter for FakeRepo {
    fn create_tag(&self, new_tag: &NewTag) -> RepositoryResult<Tag> {
        self.tag_writer.create_tag(new_tag)
    }

    fn update_tag(&self, tag_id: i32, updates: &UpdateTag) -> RepositoryResult<Tag> {
        self.tag_writer.update_tag(tag_id, updates)
    }

    fn delete_tag(&self, tag_id: i32) -> RepositoryResult<()> {
        self.tag_writer.delete_tag(tag_id)
    }
}

impl IngredientReader for FakeRepo {
    fn get_ingredient_by_id(&self, id: i32) -> RepositoryResult<Option<Ingredient>> {
        self.ingredient_reader.get_ingredient_by_id(id)
    }

    fn get_ingredients_by_ids(&self, ids: &[i32]) -> RepositoryResult<Vec<Ingredient>> {
        self.ingredient_reader.get_ingredients_by_ids(ids)
    }

    fn list_ingredients(&self, query: IngredientListQuery) -> RepositoryResult<Vec<Ingredient>> {
        self.ingredient_reader.list_ingredients(query)
    }
}

impl IngredientWriter for FakeRepo {
    fn upsert_ingredients(&self, new_ingredients: &[NewIngredient]) -> RepositoryResult<usize> {
        self.ingredient_writer.upsert_ingredients(new_ingredients)
    }
}

impl RecipeReader for FakeRepo {
    fn get_recipe_by_id(&self, id: i32) -> RepositoryResult<Option<Recipe>> {
        self.recipe_reader.get_recipe_by_id(id)
    }

    fn list_recipes(&self, query: RecipeListQuery) -> RepositoryResult<(usize, Vec<Recipe>)> {
        self.recipe_reader.list_recipes(query)
    }
}

impl RecipeWriter for FakeRepo {
    fn create_recipe(&self, new_recipe: &NewRecipe) -> RepositoryResult<Recipe> {
        self.recipe_writer.create_recipe(new_recipe)
    }

    fn update_recipe(&self, recipe_id: i32, updates: &UpdateRecipe) -> RepositoryResult<Recipe> {
        self.recipe_writer.update_recipe(recipe_id, updates)
    }

    fn delete_recipe(&self, recipe_id: i32) -> RepositoryResult<()> {
        self.recipe_writer.delete_recipe(recipe_id)
    }
}

impl MembershipReader for FakeRepo {
    fn list_member_recipe_ids(
        &self,
        user_id: i32,
        kind: MembershipKind,
        recipe_ids: &[i32],
    ) -> RepositoryResult<HashSet<i32>> {
        self.membership_reader
            .list_member_recipe_ids(user_id, kind, recipe_ids)
    }

    fn list_cart_ingredients(&self, user_id: i32) -> RepositoryResult<Vec<CartIngredient>> {
        self.membership_reader.list_cart_ingredients(user_id)
    }
}

impl MembershipWriter for FakeRepo {
    fn create_membership(&self, new_membership: &NewMembership) -> RepositoryResult<Membership> {
        self.membership_writer.create_membership(new_membership)
    }

    fn delete_membership(
        &self,
        user_id: i32,
        recipe_id: i32,
        kind: MembershipKind,
    ) -> RepositoryResult<()> {
        self.membership_writer
            .delete_membership(user_id, recipe_id, kind)
    }
}

impl SubscriptionReader for FakeRepo {
    fn list_subscribed_author_ids(
        &self,
        user_id: i32,
        author_ids: &[i32],
    ) -> RepositoryResult<HashSet<i32>> {
        self.subscription_reader
            .list_subscribed_author_ids(user_id, author_ids)
    }

    fn list_subscriptions(
        &self,
        query: SubscriptionListQuery,
    ) -> RepositoryResult<(usize, Vec<User>)> {
        self.subscription_reader.list_subscriptions(query)
    }
}

impl SubscriptionWriter for FakeRepo {
    fn create_subscription(
        &self,
        new_subscription: &NewSubscription,
    ) -> RepositoryResult<Subscription> {
        self.subscription_writer
            .create_subscription(new_subscription)
    }

    fn delete_subscription(&self, user_id: i32, author_id: i32) -> RepositoryResult<()> {
        self.subscription_writer
            .delete_subscription(user_id, author_id)
    }
}
