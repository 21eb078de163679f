use itertools::Itertools;

#[macro_export]
macro_rules! getter_fn {
    ($field_name: ident, $field_type: ty) => {
        pub fn $field_name(&self) -> &$field_type {
            &self.$field_name
        }
    };
    ($field_name:ident, mut $field_type:ty) => {
        paste::paste! {
            pub fn [<$field_name _mut>](&mut self) -> &mut $field_type {
                &mut self.$field_name
            }
        }
    };
}

#[macro_export]
macro_rules! with_field_fn {
    ($field_name: ident, $field_type: ty) => {
        paste::paste! {
            pub fn [<with_$field_name>](mut self, value: $field_type) -> Self {
                self.$field_name = value;
                self
            }
        }
    };
}

/// Collapses consecutive repeats, keeping the first of each run.
pub fn simplify_list<T, I>(items: I) -> Vec<T>
where
    I: IntoIterator<Item = T>,
    T: PartialEq, {
    items.into_iter().dedup().collect_vec()
}

/// Most frequent value. Ties go to the value that was seen first.
pub fn mode_first<T, I>(items: I) -> Option<T>
where
    I: IntoIterator<Item = T>,
    T: Eq + std::hash::Hash + Clone, {
    let mut counts = indexmap::IndexMap::<T, usize>::new();
    for item in items {
        *counts.entry(item).or_insert(0) += 1;
    }

    let mut best: Option<(&T, usize)> = None;
    for (value, count) in counts.iter() {
        match best {
            Some((_, best_count)) if *count <= best_count => {},
            _ => best = Some((value, *count)),
        }
    }
    best.map(|(value, _)| value.clone())
}
