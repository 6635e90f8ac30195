use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;

use super::SortDirection;
use crate::error::SiftResult;
use crate::model::Entity;
use crate::predicate::Access;
use crate::value::Value;

/// A compiled multi-key ordering over `T`.
///
/// Keys apply in order; ties on every key keep the input order.
pub struct CompiledSort<T> {
    keys: Vec<(Access, SortDirection)>,
    guarded: bool,
    _entity: PhantomData<fn(&T)>,
}

impl<T: Entity> CompiledSort<T> {
    pub(crate) fn new(keys: Vec<(Access, SortDirection)>, guarded: bool) -> Self {
        Self {
            keys,
            guarded,
            _entity: PhantomData,
        }
    }

    /// The sort keys in application order.
    pub fn keys(&self) -> &[(Access, SortDirection)] {
        &self.keys
    }

    /// Whether there are no keys.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// The sorted order of `items` as indices into it.
    pub fn order(&self, items: &[T]) -> SiftResult<Vec<usize>> {
        let mut indices: Vec<usize> = (0..items.len()).collect();
        if self.keys.is_empty() {
            return Ok(indices);
        }

        let rows = items
            .iter()
            .map(|item| {
                self.keys
                    .iter()
                    .map(|(access, _)| access.resolve(item, self.guarded))
                    .collect::<SiftResult<Vec<Value<'_>>>>()
            })
            .collect::<SiftResult<Vec<_>>>()?;

        indices.sort_by(|&a, &b| self.compare_rows(&rows[a], &rows[b]));
        Ok(indices)
    }

    fn compare_rows(&self, a: &[Value<'_>], b: &[Value<'_>]) -> Ordering {
        self.keys
            .iter()
            .zip(a.iter().zip(b))
            .map(|((_, direction), (a, b))| match direction {
                SortDirection::Ascending => a.sort_cmp(b),
                SortDirection::Descending => b.sort_cmp(a),
            })
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }

    /// Sort `items` in place.
    pub fn sort(&self, items: &mut [T]) -> SiftResult<()> {
        let order = self.order(items)?;
        apply_permutation(items, order);
        Ok(())
    }

    /// The items of `items` in sorted order.
    pub fn sorted<'a>(&self, items: &'a [T]) -> SiftResult<Vec<&'a T>> {
        Ok(self.order(items)?.into_iter().map(|i| &items[i]).collect())
    }

    /// Render as an SQL `ORDER BY` list, e.g. `LastName ASC, FirstName DESC`.
    pub fn to_sql(&self) -> String {
        self.keys
            .iter()
            .map(|(access, direction)| format!("{} {}", access.path(), direction.as_sql()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Move `items[order[i]]` to position `i`, following permutation cycles.
fn apply_permutation<T>(items: &mut [T], mut order: Vec<usize>) {
    for start in 0..order.len() {
        let mut current = start;
        while order[current] != start {
            let next = order[current];
            items.swap(current, next);
            order[current] = current;
            current = next;
        }
        order[current] = current;
    }
}

impl<T> fmt::Debug for CompiledSort<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledSort")
            .field("keys", &self.keys)
            .field("guarded", &self.guarded)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConditionalAccess, SortConfiguration};
    use crate::error::ErrorCode;
    use crate::model::{FieldKind, Model};
    use crate::sort::EntitySort;
    use pretty_assertions::assert_eq;
    use std::sync::OnceLock;

    struct Team {
        name: &'static str,
    }

    impl Entity for Team {
        fn model() -> &'static Model {
            static MODEL: OnceLock<Model> = OnceLock::new();
            MODEL.get_or_init(|| Model::builder("Team").field("Name", FieldKind::String).build())
        }

        fn get(&self, field: &str) -> Value<'_> {
            match field {
                "Name" => self.name.into(),
                _ => Value::Null,
            }
        }
    }

    struct Player {
        id: i64,
        name: &'static str,
        score: Option<i64>,
        team: Option<Team>,
    }

    impl Entity for Player {
        fn model() -> &'static Model {
            static MODEL: OnceLock<Model> = OnceLock::new();
            MODEL.get_or_init(|| {
                Model::builder("Player")
                    .field("Id", FieldKind::Int)
                    .field("Name", FieldKind::String)
                    .field("Score", FieldKind::Int)
                    .nullable()
                    .field("Team", FieldKind::Navigation(Team::model))
                    .nullable()
                    .build()
            })
        }

        fn get(&self, field: &str) -> Value<'_> {
            match field {
                "Id" => self.id.into(),
                "Name" => self.name.into(),
                "Score" => self.score.into(),
                "Team" => Value::optional_object(self.team.as_ref()),
                _ => Value::Null,
            }
        }
    }

    fn player(id: i64, name: &'static str, score: Option<i64>, team: Option<&'static str>) -> Player {
        Player {
            id,
            name,
            score,
            team: team.map(|name| Team { name }),
        }
    }

    fn players() -> Vec<Player> {
        vec![
            player(1, "Ann", Some(10), Some("Red")),
            player(2, "Bob", None, None),
            player(3, "Cid", Some(30), Some("Blue")),
            player(4, "Dee", Some(10), Some("Blue")),
        ]
    }

    fn ids(items: &[Player]) -> Vec<i64> {
        items.iter().map(|p| p.id).collect()
    }

    fn sort_by(syntax: &str) -> CompiledSort<Player> {
        let mut sort = EntitySort::<Player>::new();
        sort.add_syntax(syntax).unwrap();
        sort.compile().unwrap()
    }

    #[test]
    fn test_empty_sort_keeps_order() {
        let mut items = players();
        EntitySort::<Player>::new().compile().unwrap().sort(&mut items).unwrap();
        assert_eq!(ids(&items), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_nulls_first_ascending_last_descending() {
        let mut items = players();
        sort_by("score").sort(&mut items).unwrap();
        assert_eq!(ids(&items), vec![2, 1, 4, 3]);

        sort_by("-score").sort(&mut items).unwrap();
        assert_eq!(ids(&items), vec![3, 1, 4, 2]);
    }

    #[test]
    fn test_secondary_key_breaks_ties() {
        let items = players();
        let sorted = sort_by("score,-name").sorted(&items).unwrap();
        let sorted: Vec<i64> = sorted.iter().map(|p| p.id).collect();
        assert_eq!(sorted, vec![2, 4, 1, 3]);
    }

    #[test]
    fn test_navigation_key_is_guarded_by_default() {
        let mut items = players();
        sort_by("team.name,id").sort(&mut items).unwrap();
        assert_eq!(ids(&items), vec![2, 3, 4, 1]);
    }

    #[test]
    fn test_unguarded_navigation_faults() {
        let mut sort = EntitySort::<Player>::new().with_configuration(SortConfiguration {
            conditional_access: ConditionalAccess::Never,
            ..Default::default()
        });
        sort.add_syntax("team.name").unwrap();
        let err = sort.compile().unwrap().order(&players()).unwrap_err();
        assert_eq!(err.code, ErrorCode::NullNavigation);
    }

    #[test]
    fn test_to_sql() {
        assert_eq!(sort_by("name,-team.name").to_sql(), "Name ASC, Team.Name DESC");
    }

    #[test]
    fn test_apply_permutation() {
        let mut items = vec!['a', 'b', 'c', 'd'];
        apply_permutation(&mut items, vec![2, 0, 3, 1]);
        assert_eq!(items, vec!['c', 'a', 'd', 'b']);
    }
}
