use std::cmp::max;
use std::collections::HashSet;
use std::ptr;

use ahash::RandomState;

use crate::constants::EPSILON;
use crate::models::{FloatType, IntType, Matrix};
use crate::solver::cost_evaluator::CostEvaluator;
use crate::solver::improvement::linked_list::{LinkNode, LinkRoute};
use crate::solver::improvement::moves::{Moves, SwapStar};
use crate::solver::solution::{Route, RouteStats, Solution};
use crate::solver::Context;

#[inline]
pub fn route_cost(distance: IntType, overload: IntType, penalty: FloatType) -> FloatType {
    distance as FloatType + penalty * max(0, overload) as FloatType
}

#[derive(Debug, Clone, Copy)]
pub struct InsertLocation {
    pub cost: FloatType,
    pub node: *mut LinkNode,
}

impl InsertLocation {
    pub fn new() -> Self {
        Self {
            cost: FloatType::INFINITY,
            node: ptr::null_mut(),
        }
    }

    pub fn reset(&mut self) {
        self.cost = FloatType::INFINITY;
        self.node = ptr::null_mut();
    }
}

/// Keeps the three cheapest insertion locations for a (route, client) pair,
/// used by `SwapStar` to avoid rescanning a route for every candidate move.
#[derive(Debug, Clone, Copy)]
pub struct ThreeBestInserts {
    pub locations: [InsertLocation; 3],
    pub last_calculated: i32,
}

impl ThreeBestInserts {
    pub fn new() -> Self {
        Self {
            locations: [InsertLocation::new(); 3],
            last_calculated: -1,
        }
    }

    pub fn reset(&mut self) {
        for loc in self.locations.iter_mut() {
            loc.reset();
        }
    }

    pub fn add(&mut self, loc: InsertLocation) {
        if loc.cost > self.locations[2].cost {
        } else if loc.cost > self.locations[1].cost {
            self.locations[2] = loc;
        } else if loc.cost > self.locations[0].cost {
            self.locations[2] = self.locations[1];
            self.locations[1] = loc;
        } else {
            self.locations[2] = self.locations[1];
            self.locations[1] = self.locations[0];
            self.locations[0] = loc;
        }
    }
}

/// Granular local search over a pointer-linked route graph. Generalizes
/// the teacher's `improvement::local_search::LocalSearch` (CVRP-only,
/// single vehicle type) to heterogeneous fleets and time-windowed routes.
pub struct LocalSearch {
    pub ctx: &'static Context,

    pub routes: Vec<LinkRoute>,
    pub customers: Vec<usize>,
    pub unassigned: Vec<usize>,

    pub move_count: i32,
    pub moves: Moves,

    pub best_inserts: Matrix<ThreeBestInserts>,

    pub nodes: Vec<LinkNode>,
    pub start_depots: Vec<LinkNode>,
    pub end_depots: Vec<LinkNode>,

    pub empty_routes: HashSet<usize, RandomState>,

    /// `self.routes` indices for each vehicle type, in construction order.
    /// Lets `load_solution` place an incoming `Route` into the slot
    /// belonging to its own vehicle type rather than its position in
    /// `Solution.routes` (which destroy/repair freely reorder and
    /// compact).
    slot_indices_by_type: Vec<Vec<usize>>,

    pub evaluator: CostEvaluator,
}

impl LocalSearch {
    pub fn new(ctx: &Context) -> Self {
        unsafe {
            let n = ctx.problem.num_locations();
            let nodes: Vec<LinkNode> = (0..n)
                .map(|index| LinkNode::new(index, ctx.problem.get_angle(index)))
                .collect();

            let customers: Vec<usize> = (ctx.problem.num_depots()..n).collect();

            let num_vehicles = ctx.problem.num_vehicles();
            let mut start_depots = Vec::with_capacity(num_vehicles);
            let mut end_depots = Vec::with_capacity(num_vehicles);
            let mut routes = Vec::with_capacity(num_vehicles);
            let mut slot_indices_by_type = vec![Vec::new(); ctx.problem.vehicle_types().len()];

            let mut route_number = 0;
            for (vt_index, vt) in ctx.problem.vehicle_types().iter().enumerate() {
                for _ in 0..vt.num_available {
                    let start_depot = LinkNode::new_depot(vt.start_depot, 0);
                    let end_depot = LinkNode::new_depot(vt.end_depot, 0);
                    start_depots.push(start_depot);
                    end_depots.push(end_depot);
                    let start_depot_ptr =
                        start_depots.get_unchecked_mut(route_number) as *mut LinkNode;
                    let end_depot_ptr = end_depots.get_unchecked_mut(route_number) as *mut LinkNode;
                    let mut route = LinkRoute::new(route_number, start_depot_ptr, end_depot_ptr);
                    route.vehicle_type = vt_index;
                    routes.push(route);
                    slot_indices_by_type[vt_index].push(route_number);
                    route_number += 1;
                }
            }

            Self {
                ctx: &*(ctx as *const Context),
                moves: Moves::new(ctx),
                nodes,
                customers,
                unassigned: Vec::new(),
                best_inserts: Matrix::init(ThreeBestInserts::new(), num_vehicles, n),
                routes,
                move_count: 0,
                empty_routes: HashSet::with_capacity_and_hasher(
                    num_vehicles,
                    ctx.random.random_state(),
                ),
                slot_indices_by_type,
                start_depots,
                end_depots,
                evaluator: ctx.penalty_manager.borrow().evaluator,
            }
        }
    }

    pub fn refresh_penalties(&mut self) {
        self.evaluator = self.ctx.penalty_manager.borrow().evaluator;
    }

    #[inline]
    pub unsafe fn profile_of(&self, route: *const LinkRoute) -> usize {
        self.ctx.problem.vehicle_type((*route).vehicle_type).profile
    }

    #[inline]
    pub unsafe fn distance(&self, route: *const LinkRoute, from: usize, to: usize) -> IntType {
        self.ctx.problem.distance(self.profile_of(route), from, to)
    }

    /// Loads `solution` into the pointer-linked working graph. Every one of
    /// the fixed `self.routes` slots is first reset to an empty depot-to-
    /// depot link, clearing whatever a previous `run()` left behind; then
    /// each non-empty `Route` in `solution` is placed into the next unused
    /// slot matching its own vehicle type (`Solution.routes` carries no
    /// positional correspondence to vehicle type -- repair operators
    /// compact and reorder it freely). Clients in `solution.unassigned`,
    /// and any surplus routes of a type beyond its available slots, are
    /// left unlinked and carried through to `export_solution` instead of
    /// being handed to the granular descent, which only ever touches nodes
    /// that were actually linked here.
    pub fn load_solution(&mut self, solution: &Solution) {
        unsafe {
            for route_index in 0..self.routes.len() {
                let route_ptr = &mut self.routes[route_index] as *mut LinkRoute;
                let start = (*route_ptr).start_depot;
                let end = (*route_ptr).end_depot;
                LinkNode::link_nodes(start, end);
                (*route_ptr).last_tested_swap_star = -1;
                for node_number in 0..self.nodes.len() {
                    let best_insert = self.best_inserts.get_mut(route_index, node_number);
                    best_insert.reset();
                    best_insert.last_calculated = -1;
                }
                self.update_route(route_ptr);
            }

            self.unassigned = solution.unassigned.clone();
            self.customers = Vec::new();

            let mut next_slot = vec![0usize; self.slot_indices_by_type.len()];
            for route in solution.routes.iter() {
                if route.is_empty() {
                    continue;
                }
                let slots = &self.slot_indices_by_type[route.vehicle_type];
                let slot_pos = next_slot[route.vehicle_type];
                if slot_pos >= slots.len() {
                    self.unassigned.extend(route.visits.iter().copied());
                    continue;
                }
                next_slot[route.vehicle_type] += 1;
                let route_index = slots[slot_pos];

                let route_ptr = &mut self.routes[route_index] as *mut LinkRoute;
                let mut last_node = (*route_ptr).start_depot;
                for &node_index in route.visits.iter() {
                    let node = &mut self.nodes[node_index] as *mut LinkNode;
                    LinkNode::link_nodes(last_node, node);
                    last_node = node;
                    self.customers.push(node_index);
                }
                let depot_end = (*route_ptr).end_depot;
                LinkNode::link_nodes(last_node, depot_end);

                self.update_route(route_ptr);
            }
        }
    }

    pub fn reset(&mut self) {
        self.move_count = 0;
        for node in self.nodes.iter_mut() {
            node.last_tested = -1;
        }
    }

    pub fn run(&mut self, ctx: &Context, solution: &Solution) -> Solution {
        unsafe {
            self.ctx = &*(ctx as *const Context);
        }
        self.reset();
        self.refresh_penalties();
        self.load_solution(solution);
        unsafe {
            self.search();
        }
        self.export_solution()
    }

    unsafe fn search(&mut self) {
        let mut loop_count = 0;
        let mut improvement = true;
        let moves = &*{ &self.moves as *const Moves };
        while improvement {
            improvement = false;
            self.ctx.random.shuffle(self.customers.as_mut_slice());
            let customers = &*{ &self.customers as *const Vec<usize> };
            for &u_index in customers {
                let neighbours = self.ctx.neighborhood.neighbours(u_index);
                let mut cor: Vec<usize> = neighbours.to_vec();

                if !cor.is_empty() && self.ctx.random.range_usize(0, cor.len()) == 0 {
                    self.ctx.random.shuffle(&mut cor);
                }

                let u = &mut self.nodes[u_index] as *mut LinkNode;
                let mut route_u = (*u).route;

                let last_test_u = (*u).last_tested;
                (*u).last_tested = self.move_count;

                'v_loop: for &v_index in cor.iter() {
                    let v = &mut self.nodes[v_index] as *mut LinkNode;
                    let route_v = (*v).route;

                    if loop_count == 0
                        || max((*route_u).last_modified, (*route_v).last_modified) > last_test_u
                    {
                        for m in moves.neighbor.iter() {
                            let delta = m.delta(self, u, v);
                            if delta + EPSILON < 0.0 {
                                self.move_count += 1;
                                m.perform(self, u, v);
                                route_u = (*u).route;
                                improvement = true;
                                continue 'v_loop;
                            }
                        }
                        let v_pred = (*v).predecessor;
                        if !v_pred.is_null() && (*v_pred).is_depot() {
                            for m in moves.depot.iter() {
                                let delta = m.delta(self, u, v);
                                if delta + EPSILON < 0.0 {
                                    self.move_count += 1;
                                    m.perform(self, u, v);
                                    route_u = (*u).route;
                                    improvement = true;
                                    continue 'v_loop;
                                }
                            }
                        }
                    }
                }
                if loop_count > 0 && !self.empty_routes.is_empty() {
                    let empty_route_index =
                        *self.empty_routes.iter().next().expect("No empty route");
                    let route_v = &mut self.routes[empty_route_index] as *mut LinkRoute;
                    let v = (*route_v).start_depot;
                    for m in moves.empty_route.iter() {
                        let delta = m.delta(self, u, v);
                        if delta + EPSILON < 0.0 {
                            self.move_count += 1;
                            m.perform(self, u, v);
                            improvement = true;
                            break;
                        }
                    }
                }
            }
            if self.ctx.config.borrow().swap_star {
                for r1_num in 0..self.routes.len() {
                    let r1_ptr = &mut self.routes[r1_num] as *mut LinkRoute;
                    let last_tested_u = (*r1_ptr).last_tested_swap_star;
                    (*r1_ptr).last_tested_swap_star = self.move_count;
                    for r2_num in (r1_num + 1)..self.routes.len() {
                        let r2_ptr = &mut self.routes[r2_num] as *mut LinkRoute;
                        if !(*r1_ptr).is_empty()
                            && !(*r2_ptr).is_empty()
                            && (loop_count == 0 || {
                                (*r1_ptr)
                                    .last_tested_swap_star
                                    .max((*r2_ptr).last_tested_swap_star)
                                    > last_tested_u
                            })
                            && (*r1_ptr).sector.overlaps(&(*r2_ptr).sector)
                            && SwapStar::run(self, r1_ptr, r2_ptr)
                        {
                            improvement = true;
                        }
                    }
                }
                loop_count += 1;
            }
        }
    }

    fn export_solution(&self) -> Solution {
        let mut routes = Vec::with_capacity(self.routes.len());
        unsafe {
            for route in self.routes.iter() {
                let mut visits = Vec::with_capacity(route.num_customers);
                let mut next_node = (*route.start_depot).successor;
                while !next_node.is_null() && !(*next_node).is_depot() {
                    visits.push((*next_node).number);
                    next_node = (*next_node).successor;
                }
                // A slot with no customers was either reset to a direct
                // depot link by `load_solution` or never touched at all;
                // either way its cached aggregates (possibly still the
                // `LinkRoute::new` sentinels) mean nothing and must not be
                // reported as a violation.
                let stats = if route.num_customers == 0 {
                    RouteStats::default()
                } else {
                    RouteStats {
                        distance: route.distance as IntType,
                        duration: route.duration as IntType,
                        time_warp: route.time_warp as IntType,
                        excess_load: route.overload as IntType,
                        excess_distance: route.excess_distance.max(0.0) as IntType,
                        start_time: 0,
                        end_time: 0,
                    }
                };
                routes.push(Route {
                    vehicle_type: route.vehicle_type,
                    visits,
                    stats,
                });
            }
        }
        Solution {
            routes,
            unassigned: self.unassigned.clone(),
        }
    }

    /// Used to update the route after a move is performed
    pub fn update_route(&mut self, route_ptr: *mut LinkRoute) {
        unsafe {
            let vt = self.ctx.problem.vehicle_type((*route_ptr).vehicle_type);
            let profile = vt.profile;
            let problem = &self.ctx.problem;

            let mut distance = 0;
            let mut load = 0;
            let mut duration = 0.0;
            let mut time_warp = 0.0;
            let mut current_time = vt.tw_early as f64;
            let mut num_customers = 0;

            let mut prev_node_ptr = (*route_ptr).start_depot;
            (*prev_node_ptr).route = route_ptr;
            (*prev_node_ptr).position = 0;
            (*route_ptr).sector.reset();

            let mut node_ptr = (*prev_node_ptr).successor;
            let mut position = 1;

            while !node_ptr.is_null() {
                let prev_number = (*prev_node_ptr).number;
                let node_number = (*node_ptr).number;
                distance += problem.distance(profile, prev_number, node_number);
                let travel = problem.duration(profile, prev_number, node_number) as f64;

                let loc = problem.location(node_number);
                let arrival = (current_time + travel).max(loc.release_time as f64);
                let wait = (loc.tw_early as f64 - arrival).max(0.0);
                let warp = (arrival - loc.tw_late as f64).max(0.0);
                current_time = (arrival + wait - warp).max(loc.tw_early as f64);
                current_time += loc.service_duration as f64;
                duration += travel + wait + loc.service_duration as f64;
                time_warp += warp;

                load += loc.demand;

                if !(*node_ptr).is_depot() {
                    (*route_ptr).sector.extend((*node_ptr).angle);
                    num_customers += 1;
                }

                (*node_ptr).cum_distance = distance as f64;
                (*node_ptr).cum_load = load as f64;
                (*node_ptr).cum_duration = duration;
                (*node_ptr).cum_time_warp = time_warp;
                (*node_ptr).route = route_ptr;
                (*node_ptr).position = position;

                position += 1;
                prev_node_ptr = node_ptr;
                node_ptr = (*node_ptr).successor;
            }

            (*route_ptr).distance = distance as f64;
            (*route_ptr).load = load as f64;
            (*route_ptr).overload = (load - vt.capacity).max(0) as f64;
            (*route_ptr).duration = duration;
            (*route_ptr).time_warp = time_warp;
            (*route_ptr).excess_distance = (distance - vt.max_distance).max(0) as f64;
            (*route_ptr).last_modified = self.move_count;
            (*route_ptr).num_customers = num_customers;

            self.start_depots[(*route_ptr).index].predecessor = ptr::null_mut();
            self.end_depots[(*route_ptr).index].successor = ptr::null_mut();

            (*route_ptr).cost = self.evaluator.penalised_cost(
                distance,
                if num_customers == 0 { 0 } else { vt.fixed_cost },
                (*route_ptr).overload as IntType,
                time_warp as IntType,
                (*route_ptr).excess_distance as IntType,
            );

            if (*route_ptr).is_empty() {
                self.empty_routes.insert((*route_ptr).index);
            } else {
                self.empty_routes.remove(&(*route_ptr).index);
            }
        }
    }

    /// Used to preprocess the three best insertion costs for all nodes in a pair of routes
    pub unsafe fn preprocess_insertions(&mut self, r1_ptr: *mut LinkRoute, r2_ptr: *mut LinkRoute) {
        let r1 = &*r1_ptr;
        let r2 = &*r2_ptr;
        let profile = self.profile_of(r2_ptr);

        let mut u_ptr = (*r1.start_depot).successor;

        while !(*u_ptr).is_depot() {
            let u = &*u_ptr;
            let u_prev = &*u.predecessor;
            let x = &*u.successor;

            let delta_removal = self.distance(r1_ptr, u_prev.number, x.number)
                - self.distance(r1_ptr, u_prev.number, u.number)
                - self.distance(r1_ptr, u.number, x.number);
            (*u_ptr).delta_removal = delta_removal as f64;

            if r2.last_modified > self.best_inserts.get(r2.index, u.number).last_calculated {
                self.best_inserts.get_mut(r2.index, u.number).reset();
                self.best_inserts
                    .get_mut(r2.index, u.number)
                    .last_calculated = self.move_count;

                let mut v_ptr = (*r2.start_depot).successor;

                let start_number = (*r2.start_depot).number;
                let cost = self.ctx.problem.distance(profile, start_number, u.number)
                    + self.ctx.problem.distance(profile, u.number, (*v_ptr).number)
                    - self
                        .ctx
                        .problem
                        .distance(profile, start_number, (*v_ptr).number);
                self.best_inserts
                    .get_mut(r2.index, u.number)
                    .add(InsertLocation {
                        cost: cost as FloatType,
                        node: r2.start_depot,
                    });

                while !(*v_ptr).is_depot() {
                    let v = &*v_ptr;
                    let y = &*v.successor;
                    let delta_insert = self.ctx.problem.distance(profile, v.number, u.number)
                        + self.ctx.problem.distance(profile, u.number, y.number)
                        - self.ctx.problem.distance(profile, v.number, y.number);
                    let cost = delta_insert as FloatType;

                    self.best_inserts
                        .get_mut(r2.index, u.number)
                        .add(InsertLocation { cost, node: v_ptr });

                    v_ptr = v.successor;
                }
            }
            u_ptr = u.successor;
        }
    }

    /// Finds the cheapest insert location of u into the route of v,
    /// while v is removed at the same time
    pub unsafe fn cheapest_insert_and_removal(
        &mut self,
        u_ptr: *mut LinkNode,
        v_ptr: *mut LinkNode,
    ) -> (*mut LinkNode, FloatType) {
        let u = &*u_ptr;
        let v = &*v_ptr;
        let r2 = &(*v.route);
        let profile = self.profile_of(v.route);

        let best_insertion = self.best_inserts.get_mut(r2.index, u.number);
        let mut best_node = best_insertion.locations[0].node;
        let mut best_cost = best_insertion.locations[0].cost;

        let mut found =
            (*best_node).number != v.number && (*(*best_node).successor).number != v.number;
        if !found && !best_insertion.locations[1].node.is_null() {
            best_node = best_insertion.locations[1].node;
            best_cost = best_insertion.locations[1].cost;
            found = (*best_node).number != v.number && (*(*best_node).successor).number != v.number;
            if !found && !best_insertion.locations[2].node.is_null() {
                best_node = best_insertion.locations[2].node;
                best_cost = best_insertion.locations[2].cost;
                found = true;
            }
        }

        let v_prev = &*(v.predecessor);
        let y = &*(v.successor);

        let delta_cost = (self.ctx.problem.distance(profile, v_prev.number, u.number)
            + self.ctx.problem.distance(profile, u.number, y.number)
            - self.ctx.problem.distance(profile, v_prev.number, y.number))
            as FloatType;

        if !found || delta_cost < best_cost {
            best_node = v.predecessor;
            best_cost = delta_cost;
        }

        (best_node, best_cost)
    }
}

impl Drop for LocalSearch {
    fn drop(&mut self) {
        for node in self.nodes.iter_mut() {
            node.route = ptr::null_mut();
            node.predecessor = ptr::null_mut();
            node.successor = ptr::null_mut();
        }
        for node in self.start_depots.iter_mut() {
            node.route = ptr::null_mut();
            node.predecessor = ptr::null_mut();
            node.successor = ptr::null_mut();
        }
        for node in self.end_depots.iter_mut() {
            node.route = ptr::null_mut();
            node.predecessor = ptr::null_mut();
            node.successor = ptr::null_mut();
        }
    }
}
