use std::cmp::Ordering;

/// In-place quicksort with a caller-supplied comparator.
///
/// Midpoint pivot, swapped to the low end before partitioning. Elements
/// equal to the pivot are split across both sides, so runs of identical keys
/// do not degrade to quadratic time. Recursion goes into the smaller half
/// and loops on the larger one, keeping stack depth logarithmic. Not stable.
pub fn quicksort<T, F>(mut items: &mut [T], cmp: &mut F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    while items.len() > 1 {
        let p = partition(items, cmp);
        let (lo, rest) = std::mem::take(&mut items).split_at_mut(p);
        let hi = &mut rest[1..];
        if lo.len() < hi.len() {
            quicksort(lo, cmp);
            items = hi;
        } else {
            quicksort(hi, cmp);
            items = lo;
        }
    }
}

/// Partition around the middle element; returns the pivot's final index.
fn partition<T, F>(items: &mut [T], cmp: &mut F) -> usize
where
    F: FnMut(&T, &T) -> Ordering,
{
    let mid = items.len() / 2;
    items.swap(0, mid);

    let (pivot, rest) = match items.split_first_mut() {
        Some(split) => split,
        None => return 0,
    };
    // rest[..i] <= pivot, rest[j..] >= pivot
    let mut i = 0;
    let mut j = rest.len();
    while i < j {
        while i < j && cmp(&rest[i], pivot) == Ordering::Less {
            i += 1;
        }
        while i < j && cmp(&rest[j - 1], pivot) == Ordering::Greater {
            j -= 1;
        }
        if i < j {
            j -= 1;
            rest.swap(i, j);
            i += 1;
        }
    }

    items.swap(0, j);
    j
}
