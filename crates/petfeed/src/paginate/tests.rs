use crate::{Direction, Error, Order, Page, PageRequest, Paginator, Record, Sort};
use core::cmp::Ordering;

#[derive(Clone, Debug, PartialEq, Eq)]
struct Row {
    id: u32,
    created_at: u32,
    likes: u32,
    title: &'static str,
}

impl Record for Row {
    type Id = u32;
    const SORT_FIELDS: &'static [&'static str] = &["id", "created_at", "likes", "title"];

    fn id(&self) -> &u32 {
        &self.id
    }

    fn cmp_field(&self, other: &Self, field: &str) -> Ordering {
        match field {
            "id" => self.id.cmp(&other.id),
            "created_at" => self.created_at.cmp(&other.created_at),
            "likes" => self.likes.cmp(&other.likes),
            "title" => self.title.cmp(other.title),
            _ => unreachable!("unvalidated field {field}"),
        }
    }
}

const TITLES: [&str; 4] = ["walk", "nap", "treat", "bath"];

/// `n` rows whose creation time grows with the id, inserted out of order.
fn rows(n: u32) -> Vec<Row> {
    let mut rows: Vec<Row> = (1..=n)
        .map(|id| Row {
            id,
            created_at: 1_000 + id * 10,
            likes: id % 3,
            title: TITLES[(id % 4) as usize],
        })
        .collect();
    rows.reverse();
    rows.rotate_left((n / 3) as usize);
    rows
}

fn ids(page: &Page<Row, u32>) -> Vec<u32> {
    page.items().iter().map(|row| row.id).collect()
}

fn walk_all(records: &[Row], template: &PageRequest<u32>) -> Vec<u32> {
    let mut seen = Vec::new();
    let mut request = template.clone();
    loop {
        let page = Paginator::new(records.to_vec()).paginate(&request).unwrap();
        seen.extend(ids(&page));
        match page.next_cursor() {
            Some(cursor) => request.cursor = Some(*cursor),
            None => break seen,
        }
    }
}

#[test]
fn twenty_five_records_in_pages_of_ten() {
    let records = rows(25);
    let request = PageRequest::new(10).with_sorts(["-created_at"]);

    let first = Paginator::new(records.clone()).paginate(&request).unwrap();
    assert_eq!(ids(&first), (16..=25).rev().collect::<Vec<_>>());
    assert!(first.has_more());
    assert_eq!(first.next_cursor(), Some(&16));

    let request = request.with_cursor(first.next_cursor().copied());
    let second = Paginator::new(records.clone()).paginate(&request).unwrap();
    assert_eq!(ids(&second), (6..=15).rev().collect::<Vec<_>>());
    assert!(second.has_more());
    assert_eq!(second.next_cursor(), Some(&6));

    let request = request.with_cursor(second.next_cursor().copied());
    let third = Paginator::new(records).paginate(&request).unwrap();
    assert_eq!(ids(&third), vec![5, 4, 3, 2, 1]);
    assert!(!third.has_more());
    assert_eq!(third.next_cursor(), None);
}

#[test]
fn exactly_limit_records_has_no_more() {
    let page = Paginator::new(rows(10))
        .paginate(&PageRequest::new(10))
        .unwrap();
    assert_eq!(page.len(), 10);
    assert!(!page.has_more());
    assert_eq!(page.next_cursor(), None);
}

#[test]
fn page_invariants_hold_for_every_limit() {
    let records = rows(17);
    for limit in 1..=20 {
        for sorts in [vec![], vec!["-id"], vec!["likes", "title"]] {
            let request = PageRequest::new(limit).with_sorts(sorts.clone());
            let page = Paginator::new(records.clone()).paginate(&request).unwrap();

            assert!(page.len() <= usize::try_from(limit).unwrap());
            assert_eq!(page.has_more(), records.len() > page.len(), "{limit} {sorts:?}");
            if page.has_more() {
                assert_eq!(page.next_cursor(), page.items().last().map(|row| &row.id));
            } else {
                assert_eq!(page.next_cursor(), None);
            }
        }
    }
}

#[test]
fn following_cursors_visits_everything_once_in_order() {
    let records = rows(23);

    let cases: [(&[&str], Vec<u32>); 4] = [
        (&[], (1..=23).collect()),
        (&["id"], (1..=23).collect()),
        (&["-id"], (1..=23).rev().collect()),
        (&["-created_at"], (1..=23).rev().collect()),
    ];

    for (sorts, expected) in cases {
        for limit in [1, 4, 10, 23, 50] {
            let template = PageRequest::new(limit).with_sorts(sorts.iter().copied());
            assert_eq!(walk_all(&records, &template), expected, "{sorts:?} limit {limit}");
        }
    }
}

#[test]
fn before_walks_back_from_the_cursor() {
    let records = rows(12);
    let request = PageRequest::new(3)
        .with_sorts(["-id"])
        .with_direction(Direction::Before)
        .with_cursor(Some(5));

    let page = Paginator::new(records.clone()).paginate(&request).unwrap();
    assert_eq!(ids(&page), vec![6, 7, 8]);
    assert!(page.has_more());
    assert_eq!(page.next_cursor(), Some(&8));

    let request = request.with_cursor(page.next_cursor().copied());
    let page = Paginator::new(records.clone()).paginate(&request).unwrap();
    assert_eq!(ids(&page), vec![9, 10, 11]);
    assert!(page.has_more());

    let request = request.with_cursor(page.next_cursor().copied());
    let page = Paginator::new(records).paginate(&request).unwrap();
    assert_eq!(ids(&page), vec![12]);
    assert!(!page.has_more());
    assert_eq!(page.next_cursor(), None);
}

#[test]
fn before_ascending_reads_smaller_ids() {
    let request = PageRequest::new(2)
        .with_direction(Direction::Before)
        .with_cursor(Some(4));
    let page = Paginator::new(rows(9)).paginate(&request).unwrap();
    assert_eq!(ids(&page), vec![3, 2]);
    assert!(page.has_more());
    assert_eq!(page.next_cursor(), Some(&2));
}

#[test]
fn repeated_calls_are_identical() {
    let paginator = Paginator::new(rows(30));
    let request = PageRequest::new(7)
        .with_sorts(["likes", "-title"])
        .with_cursor(Some(11));

    let a = paginator.clone().paginate(&request).unwrap();
    let b = paginator.paginate(&request).unwrap();
    assert_eq!(a, b);
}

#[test]
fn composes_sort_keys_with_id_tiebreak() {
    let records = rows(12);
    let page = Paginator::new(records)
        .paginate(&PageRequest::new(12).with_sorts(["-likes", "title"]))
        .unwrap();

    // likes = id % 3, title = TITLES[id % 4]
    assert_eq!(ids(&page), vec![11, 5, 2, 8, 7, 1, 10, 4, 3, 9, 6, 12]);
}

#[test]
fn cursor_need_not_exist_in_the_collection() {
    let records: Vec<Row> = rows(10).into_iter().filter(|row| row.id != 6).collect();
    let request = PageRequest::new(2).with_sorts(["-id"]).with_cursor(Some(6));
    let page = Paginator::new(records).paginate(&request).unwrap();
    assert_eq!(ids(&page), vec![5, 4]);
}

#[test]
fn filter_narrows_the_base_collection() {
    let page = Paginator::new(rows(20))
        .filter(|row| row.likes == 0)
        .paginate(&PageRequest::new(3).with_sorts(["-id"]))
        .unwrap();
    assert_eq!(ids(&page), vec![18, 15, 12]);
    assert!(page.has_more());
}

#[test]
fn empty_collection_yields_empty_page() {
    let page = Paginator::<Row>::new(Vec::new())
        .paginate(&PageRequest::new(5).with_cursor(Some(3)))
        .unwrap();
    assert_eq!(page, Page::empty());
}

#[test]
fn unknown_sort_field_is_rejected() {
    let err = Paginator::new(rows(3))
        .paginate(&PageRequest::new(5).with_sorts(["created_at", "-owner"]))
        .unwrap_err();
    assert_eq!(
        err,
        Error::InvalidSortField {
            field: "owner".to_owned()
        }
    );
}

#[test]
fn non_positive_limits_are_rejected() {
    for limit in [0, -1, i64::MIN] {
        let err = Paginator::new(rows(3))
            .paginate(&PageRequest::new(limit))
            .unwrap_err();
        assert_eq!(err, Error::InvalidLimit { limit });
    }
}

#[test]
fn sort_specs_parse_and_display() {
    let sort = Sort::parse::<Row>(" -created_at ").unwrap();
    assert_eq!(sort, Sort::desc("created_at"));
    assert_eq!(sort.order(), Order::Desc);
    assert_eq!(sort.to_string(), "-created_at");
    assert_eq!(Sort::parse::<Row>("title").unwrap(), Sort::asc("title"));
    assert!(Sort::parse::<Row>("-").is_err());
}

#[test]
fn page_map_keeps_metadata() {
    let page = Paginator::new(rows(5))
        .paginate(&PageRequest::new(2).with_sorts(["-id"]))
        .unwrap()
        .map(|row| row.title)
        .map_cursor(|id| id.to_string());

    assert_eq!(page.items(), &["nap", "walk"]);
    assert!(page.has_more());
    assert_eq!(page.next_cursor().map(String::as_str), Some("4"));
}
